use waypoint_core::StoreError;

pub(crate) fn map_redis_error(err: redis::RedisError) -> StoreError {
    let message = err.to_string();

    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Query(message)
    }
}
