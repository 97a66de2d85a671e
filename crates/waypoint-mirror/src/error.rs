use waypoint_core::MirrorError;

pub(crate) fn map_redis_error(err: redis::RedisError) -> MirrorError {
    let message = err.to_string();

    if err.is_timeout() {
        MirrorError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
        MirrorError::Unavailable(message)
    } else {
        MirrorError::Operation(message)
    }
}
