use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::Stream;
use jiff::Timestamp;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace, warn};
use waypoint_core::{
    ChangeEvent, ConfigSource, FeedItem, Namespace, RecordStore, ShortLinkRecord, StoreError,
    Token,
};

type Result<T> = std::result::Result<T, StoreError>;

/// Number of change events buffered per subscriber before it starts lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct Entry {
    destination_url: String,
    modified_at: Timestamp,
}

impl Entry {
    fn into_record(self, token: Token) -> ShortLinkRecord {
        ShortLinkRecord {
            token,
            destination_url: self.destination_url,
            modified_at: Some(self.modified_at),
        }
    }
}

/// In-memory record store with a built-in change feed.
///
/// Every successful `put`, and every `delete` that removed something, is
/// broadcast as a [`ChangeEvent`] carrying the full path name. Subscribers
/// that fall behind by more than the feed capacity lose events and receive
/// a [`FeedItem::Lagged`] in their place.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    namespace: Namespace,
    records: DashMap<Token, Entry>,
    params: DashMap<String, String>,
    events: broadcast::Sender<ChangeEvent>,
}

impl InMemoryRecordStore {
    /// Creates an empty store for the given namespace.
    pub fn new(namespace: Namespace) -> Self {
        Self::with_feed_capacity(namespace, DEFAULT_FEED_CAPACITY)
    }

    /// Creates an empty store whose change feed buffers `capacity` events.
    pub fn with_feed_capacity(namespace: Namespace, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            namespace,
            records: DashMap::new(),
            params: DashMap::new(),
            events,
        }
    }

    /// Sets a shared configuration parameter.
    pub fn set_config(&self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Subscribes to the raw change feed.
    ///
    /// Only events emitted after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Subscribes to the change feed as a stream.
    ///
    /// The subscription is taken immediately, not on first poll. Dropped
    /// events surface as one [`FeedItem::Lagged`] before the stream resumes
    /// at the oldest retained event. The stream ends when the store is
    /// dropped.
    pub fn changes(&self) -> impl Stream<Item = FeedItem> + Send + 'static {
        futures_util::stream::unfold(self.subscribe(), |mut rx| async move {
            match rx.recv().await {
                Ok(event) => Some((FeedItem::Change(event), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Change feed subscriber lagged, events dropped");
                    Some((FeedItem::Lagged(skipped), rx))
                }
                Err(RecvError::Closed) => None,
            }
        })
    }

    fn emit(&self, event: ChangeEvent) {
        trace!(kind = %event.kind, name = %event.name, "Emitting change event");
        // No subscribers is fine: nobody is mirroring yet.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ConfigSource for InMemoryRecordStore {
    async fn get_config(&self, name: &str) -> Result<Option<String>> {
        Ok(self.params.get(name).map(|value| value.value().clone()))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn put(&self, token: &Token, destination_url: &str) -> Result<()> {
        let entry = Entry {
            destination_url: destination_url.to_string(),
            modified_at: Timestamp::now(),
        };

        if self.records.insert(token.clone(), entry).is_some() {
            debug!(token = %token, "Overwrote existing record");
        }

        self.emit(ChangeEvent::create(self.namespace.path_for(token)));
        Ok(())
    }

    async fn get(&self, token: &Token) -> Result<Option<ShortLinkRecord>> {
        Ok(self
            .records
            .get(token)
            .map(|entry| entry.value().clone().into_record(token.clone())))
    }

    async fn delete(&self, token: &Token) -> Result<bool> {
        let removed = self.records.remove(token).is_some();
        if removed {
            self.emit(ChangeEvent::delete(self.namespace.path_for(token)));
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<ShortLinkRecord>> {
        Ok(self
            .records
            .iter()
            .map(|item| item.value().clone().into_record(item.key().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::Arc;
    use waypoint_core::ChangeKind;

    fn token(s: &str) -> Token {
        Token::new(s).unwrap()
    }

    fn store() -> InMemoryRecordStore {
        InMemoryRecordStore::new(Namespace::new("/urls/links"))
    }

    #[tokio::test]
    async fn put_and_get() {
        let store = store();

        store.put(&token("abc123"), "https://example.com").await.unwrap();

        let record = store.get(&token("abc123")).await.unwrap().unwrap();
        assert_eq!(record.token, token("abc123"));
        assert_eq!(record.destination_url, "https://example.com");
        assert!(record.modified_at.is_some());
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let store = store();
        assert!(store.get(&token("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = store();

        store.put(&token("abc"), "https://old.com").await.unwrap();
        store.put(&token("abc"), "https://new.com").await.unwrap();

        let record = store.get(&token("abc")).await.unwrap().unwrap();
        assert_eq!(record.destination_url, "https://new.com");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        store.put(&token("abc"), "https://example.com").await.unwrap();

        assert!(store.delete(&token("abc")).await.unwrap());
        assert!(!store.delete(&token("abc")).await.unwrap());
        assert!(store.get(&token("abc")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_and_delete_emit_full_path_events() {
        let store = store();
        let mut rx = store.subscribe();

        store.put(&token("abc"), "https://example.com").await.unwrap();
        store.delete(&token("abc")).await.unwrap();

        let created = rx.recv().await.unwrap();
        assert_eq!(created.kind, ChangeKind::Create);
        assert_eq!(created.name, "/urls/links/abc");

        let deleted = rx.recv().await.unwrap();
        assert_eq!(deleted.kind, ChangeKind::Delete);
        assert_eq!(deleted.name, "/urls/links/abc");
    }

    #[tokio::test]
    async fn deleting_missing_token_emits_nothing() {
        let store = store();
        let mut rx = store.subscribe();

        store.delete(&token("ghost")).await.unwrap();

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn changes_stream_yields_events() {
        let store = store();
        let changes = store.changes();
        tokio::pin!(changes);

        store.put(&token("abc"), "https://example.com").await.unwrap();

        let item = changes.next().await.unwrap();
        assert_eq!(item, FeedItem::Change(ChangeEvent::create("/urls/links/abc")));
    }

    #[tokio::test]
    async fn changes_stream_reports_lag_then_resumes() {
        let store = InMemoryRecordStore::with_feed_capacity(Namespace::new("/urls/links"), 2);
        let changes = store.changes();
        tokio::pin!(changes);

        for i in 0..5 {
            store
                .put(&token(&format!("t{i}")), "https://example.com")
                .await
                .unwrap();
        }

        // The three oldest events were overwritten; the stream resumes at the
        // oldest retained one.
        assert_eq!(changes.next().await.unwrap(), FeedItem::Lagged(3));
        assert_eq!(
            changes.next().await.unwrap(),
            FeedItem::Change(ChangeEvent::create("/urls/links/t3"))
        );
    }

    #[tokio::test]
    async fn config_parameters() {
        let store = store();
        store.set_config("chars", "abc");

        assert_eq!(store.get_config("chars").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get_config("dom").await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_puts_to_same_token_keep_one_record() {
        let store = Arc::new(store());
        let mut handles = vec![];

        for i in 0..10u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .put(&token("same"), &format!("https://example{i}.com"))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].destination_url.starts_with("https://example"));
    }
}
