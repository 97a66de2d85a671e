//! Core types and traits for the Waypoint URL shortener.
//!
//! This crate holds everything shared between the write path and the sync
//! path: the token codec, the configuration struct, the change-event model,
//! and the store traits that the backends in `waypoint-storage` and
//! `waypoint-mirror` implement.

#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod error;
pub mod event;
pub mod glob;
pub mod mirror;
pub mod settings;
pub mod store;
pub mod token;

pub use codec::{TokenCodec, DEFAULT_TOKEN_LENGTH};
pub use error::{ConfigError, MirrorError, StoreError, TokenError};
pub use event::{ChangeEvent, ChangeKind, FeedItem};
pub use mirror::{MirrorStore, ObjectAcl, RedirectObject};
pub use settings::{Namespace, PublicUrl, Settings};
pub use store::{ConfigSource, RecordStore, ShortLinkRecord};
pub use token::{Alphabet, Token};
