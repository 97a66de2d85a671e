use crate::error::MirrorError;
use crate::token::Token;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

type Result<T> = std::result::Result<T, MirrorError>;

/// Access policy attached to a mirror object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

impl ObjectAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
        }
    }
}

impl Display for ObjectAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectAcl {
    type Err = MirrorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "private" => Ok(ObjectAcl::Private),
            "public-read" => Ok(ObjectAcl::PublicRead),
            other => Err(MirrorError::InvalidData(format!("unknown acl '{other}'"))),
        }
    }
}

/// A bodiless bucket object that redirects to `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectObject {
    pub key: Token,
    pub location: String,
    pub acl: ObjectAcl,
}

impl RedirectObject {
    /// The object shape `publish` writes.
    pub fn public(key: Token, location: impl Into<String>) -> Self {
        Self {
            key,
            location: location.into(),
            acl: ObjectAcl::PublicRead,
        }
    }
}

/// The public redirect bucket.
///
/// Objects are keyed by token and are a disposable view of the record store.
#[async_trait]
pub trait MirrorStore: Send + Sync + 'static {
    /// Creates or overwrites a public-read redirect object.
    async fn publish(&self, key: &Token, location: &str) -> Result<()>;

    /// Deletes the object. Returns `true` if it existed.
    /// Deleting a missing key is not an error.
    async fn unpublish(&self, key: &Token) -> Result<bool>;

    /// Returns the object metadata, or `None` if there is no such object.
    async fn head(&self, key: &Token) -> Result<Option<RedirectObject>>;

    /// Lists every object key in the bucket.
    async fn keys(&self) -> Result<Vec<Token>>;
}
