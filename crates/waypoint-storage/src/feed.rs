use crate::error::map_redis_error;
use waypoint_core::glob::escape_glob;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};
use waypoint_core::{ChangeEvent, ChangeKind, Namespace, StoreError};

type Result<T> = std::result::Result<T, StoreError>;

/// `notify-keyspace-events` flags needed by the feed: keyspace channel,
/// hash and generic commands, expirations and evictions.
pub const NOTIFY_KEYSPACE_EVENTS: &str = "Khgxe";

/// Change notifications for a [`RedisRecordStore`](crate::RedisRecordStore)
/// namespace, derived from Redis keyspace notifications.
///
/// Redis pub/sub is fire-and-forget: notifications published while the feed
/// is disconnected are lost. Consumers are expected to reconcile on start and
/// periodically.
#[derive(Debug, Clone)]
pub struct RedisChangeFeed {
    client: redis::Client,
    namespace: Namespace,
    db: i64,
}

impl RedisChangeFeed {
    pub fn new(client: redis::Client, namespace: Namespace, db: i64) -> Self {
        Self {
            client,
            namespace,
            db,
        }
    }

    /// Opens a client for `redis_url` and builds a feed on it.
    pub fn open(redis_url: &str, namespace: Namespace, db: i64) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(map_redis_error)?;
        Ok(Self::new(client, namespace, db))
    }

    /// Turns on the keyspace notifications this feed depends on.
    ///
    /// Managed Redis offerings often forbid `CONFIG SET`; there the setting
    /// must be applied out of band and this call can be skipped.
    pub async fn enable_notifications(&self) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;

        let _: () = redis::cmd("CONFIG")
            .arg("SET")
            .arg("notify-keyspace-events")
            .arg(NOTIFY_KEYSPACE_EVENTS)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        info!(flags = NOTIFY_KEYSPACE_EVENTS, "Enabled Redis keyspace notifications");
        Ok(())
    }

    /// Subscribes to notifications for every key under the namespace.
    pub async fn subscribe(&self) -> Result<impl Stream<Item = ChangeEvent> + Send + 'static> {
        let channel_prefix = channel_prefix(self.db);
        let pattern = format!(
            "{}{}/*",
            channel_prefix,
            escape_glob(self.namespace.prefix())
        );

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(map_redis_error)?;
        pubsub
            .psubscribe(&pattern)
            .await
            .map_err(map_redis_error)?;

        info!(pattern = %pattern, "Subscribed to record store notifications");

        Ok(pubsub.into_on_message().filter_map(move |msg| {
            let event = match msg.get_payload::<String>() {
                Ok(operation) => {
                    parse_notification(&channel_prefix, msg.get_channel_name(), &operation)
                }
                Err(e) => {
                    warn!(channel = %msg.get_channel_name(), error = %e, "Unreadable notification payload");
                    None
                }
            };
            futures_util::future::ready(event)
        }))
    }
}

fn channel_prefix(db: i64) -> String {
    format!("__keyspace@{}__:", db)
}

/// Maps a keyspace notification to a change event.
///
/// `channel` is `__keyspace@<db>__:<key>` and `operation` the command name.
fn parse_notification(channel_prefix: &str, channel: &str, operation: &str) -> Option<ChangeEvent> {
    let name = channel.strip_prefix(channel_prefix)?;

    let kind = match operation {
        "hset" | "set" | "rename_to" | "restore" => ChangeKind::Create,
        "del" | "expired" | "evicted" | "rename_from" => ChangeKind::Delete,
        other => {
            debug!(name = %name, operation = %other, "Ignoring keyspace notification");
            return None;
        }
    };

    Some(ChangeEvent {
        kind,
        name: name.to_string(),
    })
}
