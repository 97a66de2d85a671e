use crate::error::StoreError;
use crate::token::Token;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, StoreError>;

/// An authoritative short link entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLinkRecord {
    pub token: Token,
    /// Opaque destination; the store never interprets it.
    pub destination_url: String,
    /// When the entry was last written, if the backend tracks it.
    pub modified_at: Option<Timestamp>,
}

/// Read-only access to shared configuration scalars.
#[async_trait]
pub trait ConfigSource: Send + Sync + 'static {
    /// Returns the named parameter, or `None` if it is not set.
    async fn get_config(&self, name: &str) -> Result<Option<String>>;
}

/// The authoritative `token -> destination URL` namespace.
///
/// Backends are expected to emit a change notification carrying the full
/// path name after every `put` and `delete`; that notification is the only
/// input of the mirror synchronisation.
#[async_trait]
pub trait RecordStore: ConfigSource {
    /// Creates or overwrites the record for `token`. Last write wins.
    async fn put(&self, token: &Token, destination_url: &str) -> Result<()>;

    /// Returns the current record, or `None` if the token does not exist.
    async fn get(&self, token: &Token) -> Result<Option<ShortLinkRecord>>;

    /// Removes the record. Returns `true` if it existed.
    /// Deleting a missing token is not an error.
    async fn delete(&self, token: &Token) -> Result<bool>;

    /// Returns every live record in the namespace.
    async fn list(&self) -> Result<Vec<ShortLinkRecord>>;
}
