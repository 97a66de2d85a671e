use std::result::Result as StdResult;
use std::time::Duration;
use thiserror::Error;

/// Failures while starting or talking to a disposable test server.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis at {url} did not answer PING within {waited:?}: {last_error}")]
    NotReady {
        url: String,
        waited: Duration,
        last_error: redis::RedisError,
    },
}

pub type Result<T> = StdResult<T, TestInfraError>;
