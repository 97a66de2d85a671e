use thiserror::Error;

/// Errors raised while building or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("alphabet must contain at least one character")]
    EmptyAlphabet,
    #[error("alphabet must not contain the path separator '/'")]
    SeparatorInAlphabet,
    #[error("token length must be greater than zero")]
    ZeroTokenLength,
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("configuration parameter '{0}' is not set")]
    MissingParameter(String),
    #[error("failed to read configuration: {0}")]
    Source(#[from] StoreError),
}

/// Errors produced when a string cannot be used as a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token must not be empty")]
    Empty,
    #[error("token must be a single path segment: '{0}'")]
    NotASegment(String),
}

/// Errors returned by record store backends.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store operation timed out: {0}")]
    Timeout(String),
    #[error("record store query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("record store operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

/// Errors returned by mirror (bucket) backends.
#[derive(Debug, Clone, Error)]
pub enum MirrorError {
    #[error("mirror bucket unavailable: {0}")]
    Unavailable(String),
    #[error("mirror operation timed out: {0}")]
    Timeout(String),
    #[error("mirror object is invalid: {0}")]
    InvalidData(String),
    #[error("mirror operation failed: {0}")]
    Operation(String),
}

impl MirrorError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, MirrorError::Unavailable(_) | MirrorError::Timeout(_))
    }
}
