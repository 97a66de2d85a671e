//! Redirect bucket backends.
//!
//! A bucket holds one bodiless object per token whose only payload is the
//! redirect location and an access policy. [`InMemoryBucket`] suits single
//! process deployments and tests; [`RedisBucket`] stores one hash per object.

mod error;
pub mod memory;
pub mod redis;

pub use memory::InMemoryBucket;
pub use self::redis::RedisBucket;
pub use waypoint_core::{MirrorError, MirrorStore, ObjectAcl, RedirectObject};
