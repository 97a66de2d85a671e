use thiserror::Error;
use waypoint_core::StoreError;

/// Message returned when a create request carries no destination URL.
pub const MISSING_URL: &str = "No 'url' has been provided.";
/// Message returned when a delete request carries no token.
pub const MISSING_TOKEN: &str = "No 'token' has been provided.";

pub type Result<T, E = ShortenerError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    /// The request is malformed. The message is shown to the client as-is.
    #[error("{0}")]
    Validation(String),
    #[error("short link not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ShortenerError {
    pub fn missing_url() -> Self {
        Self::Validation(MISSING_URL.to_string())
    }

    pub fn missing_token() -> Self {
        Self::Validation(MISSING_TOKEN.to_string())
    }
}
