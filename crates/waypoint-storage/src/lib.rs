//! Record store backends.
//!
//! [`InMemoryRecordStore`] keeps records in process and publishes change
//! events on a broadcast channel; [`RedisRecordStore`] keeps one hash per
//! record path and relies on Redis keyspace notifications, read back through
//! [`RedisChangeFeed`].

mod error;
pub mod feed;
pub mod memory;
pub mod redis;

pub use feed::RedisChangeFeed;
pub use memory::InMemoryRecordStore;
pub use self::redis::{RedisParameters, RedisRecordStore};
pub use waypoint_core::{ConfigSource, RecordStore, ShortLinkRecord, StoreError};
