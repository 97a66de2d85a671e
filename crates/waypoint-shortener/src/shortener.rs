use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use waypoint_core::{ShortLinkRecord, Token};

/// A request to shorten `url`, optionally under a chosen alias.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// The destination URL. Absent and empty are both rejected.
    #[serde(default)]
    pub url: Option<String>,
    /// A requested alias. Characters outside the alphabet are dropped.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLink {
    pub token: Token,
    pub short_url: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteLinkRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[async_trait]
pub trait LinkService: Send + Sync + 'static {
    /// Stores a link and returns its token and public short URL.
    ///
    /// Storing under a token that already exists overwrites the old link.
    async fn create_link(&self, request: CreateLinkRequest) -> Result<CreatedLink>;

    /// Removes a link. Deleting an unknown token succeeds.
    async fn delete_link(&self, request: DeleteLinkRequest) -> Result<()>;

    /// Reads a link from the record store.
    async fn resolve_link(&self, token: &str) -> Result<ShortLinkRecord>;
}
