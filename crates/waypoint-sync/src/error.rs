use thiserror::Error;
use waypoint_core::{MirrorError, StoreError};

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),
}

impl SyncError {
    /// Whether handling the same event again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Store(e) => e.is_transient(),
            SyncError::Mirror(e) => e.is_transient(),
        }
    }
}
