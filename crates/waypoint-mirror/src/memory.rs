use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, trace};
use waypoint_core::{MirrorError, MirrorStore, RedirectObject, Token};

type Result<T> = std::result::Result<T, MirrorError>;

/// In-memory redirect bucket backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryBucket {
    objects: DashMap<Token, RedirectObject>,
}

impl InMemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the bucket.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Inserts an object as-is, bypassing `publish`.
    pub fn insert_raw(&self, object: RedirectObject) {
        self.objects.insert(object.key.clone(), object);
    }
}

#[async_trait]
impl MirrorStore for InMemoryBucket {
    async fn publish(&self, key: &Token, location: &str) -> Result<()> {
        trace!(key = %key, "Publishing redirect object");
        self.objects
            .insert(key.clone(), RedirectObject::public(key.clone(), location));
        debug!(key = %key, location = %location, "Published redirect object");
        Ok(())
    }

    async fn unpublish(&self, key: &Token) -> Result<bool> {
        let removed = self.objects.remove(key).is_some();
        debug!(key = %key, removed, "Unpublished redirect object");
        Ok(removed)
    }

    async fn head(&self, key: &Token) -> Result<Option<RedirectObject>> {
        Ok(self.objects.get(key).map(|object| object.value().clone()))
    }

    async fn keys(&self) -> Result<Vec<Token>> {
        Ok(self.objects.iter().map(|item| item.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::ObjectAcl;

    fn key(s: &str) -> Token {
        Token::new(s).unwrap()
    }

    #[tokio::test]
    async fn publish_creates_public_redirect() {
        let bucket = InMemoryBucket::new();

        bucket.publish(&key("abc"), "https://example.com").await.unwrap();

        let object = bucket.head(&key("abc")).await.unwrap().unwrap();
        assert_eq!(object.location, "https://example.com");
        assert_eq!(object.acl, ObjectAcl::PublicRead);
    }

    #[tokio::test]
    async fn publish_twice_is_idempotent() {
        let bucket = InMemoryBucket::new();

        bucket.publish(&key("abc"), "https://example.com").await.unwrap();
        let once = bucket.head(&key("abc")).await.unwrap();
        bucket.publish(&key("abc"), "https://example.com").await.unwrap();

        assert_eq!(bucket.head(&key("abc")).await.unwrap(), once);
        assert_eq!(bucket.len(), 1);
    }

    #[tokio::test]
    async fn publish_overwrites_location() {
        let bucket = InMemoryBucket::new();

        bucket.publish(&key("abc"), "https://old.com").await.unwrap();
        bucket.publish(&key("abc"), "https://new.com").await.unwrap();

        let object = bucket.head(&key("abc")).await.unwrap().unwrap();
        assert_eq!(object.location, "https://new.com");
    }

    #[tokio::test]
    async fn unpublish_is_idempotent() {
        let bucket = InMemoryBucket::new();
        bucket.publish(&key("abc"), "https://example.com").await.unwrap();

        assert!(bucket.unpublish(&key("abc")).await.unwrap());
        assert!(!bucket.unpublish(&key("abc")).await.unwrap());
        assert!(bucket.head(&key("abc")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keys_lists_every_object() {
        let bucket = InMemoryBucket::new();
        bucket.publish(&key("a"), "https://a").await.unwrap();
        bucket.publish(&key("b"), "https://b").await.unwrap();

        let mut keys = bucket.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec![key("a"), key("b")]);
    }
}
