use crate::error::map_redis_error;
use waypoint_core::glob::escape_glob;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, trace, warn};
use waypoint_core::{MirrorError, MirrorStore, ObjectAcl, RedirectObject, Token};

type Result<T> = std::result::Result<T, MirrorError>;

const LOCATION_FIELD: &str = "location";
const ACL_FIELD: &str = "acl";
const SCAN_BATCH: usize = 500;

/// A redirect bucket stored in Redis.
///
/// Each object is a hash at `<bucket>:<key>` with a `location` and an `acl`
/// field. A publish replaces the whole hash in one `MULTI`, so a reader never
/// sees a half-written object.
#[derive(Debug, Clone)]
pub struct RedisBucket {
    conn: MultiplexedConnection,
    bucket: String,
}

impl RedisBucket {
    pub fn new(conn: MultiplexedConnection, bucket: impl Into<String>) -> Self {
        Self {
            conn,
            bucket: bucket.into(),
        }
    }

    /// Opens a new multiplexed connection and creates a bucket on it.
    pub async fn connect(redis_url: &str, bucket: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(map_redis_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;
        Ok(Self::new(conn, bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_key(&self, key: &Token) -> String {
        format!("{}:{}", self.bucket, key)
    }
}

/// Recovers the token from a `<bucket>:<key>` object key.
fn key_from_object(bucket: &str, object_key: &str) -> Option<Token> {
    let rest = object_key.strip_prefix(bucket)?.strip_prefix(':')?;
    Token::new(rest).ok()
}

fn parse_object(key: Token, mut fields: HashMap<String, String>) -> Result<RedirectObject> {
    let location = fields.remove(LOCATION_FIELD).ok_or_else(|| {
        MirrorError::InvalidData(format!("object '{}' has no '{}' field", key, LOCATION_FIELD))
    })?;
    let acl = match fields.get(ACL_FIELD) {
        Some(raw) => raw.parse::<ObjectAcl>()?,
        None => ObjectAcl::Private,
    };

    Ok(RedirectObject { key, location, acl })
}

#[async_trait]
impl MirrorStore for RedisBucket {
    async fn publish(&self, key: &Token, location: &str) -> Result<()> {
        let object_key = self.object_key(key);
        trace!(key = %object_key, "Publishing redirect object to Redis");

        let fields = [
            (LOCATION_FIELD, location),
            (ACL_FIELD, ObjectAcl::PublicRead.as_str()),
        ];

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(&object_key)
            .ignore()
            .hset_multiple(&object_key, &fields[..])
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(map_redis_error)?;

        debug!(key = %object_key, location = %location, "Published redirect object");
        Ok(())
    }

    async fn unpublish(&self, key: &Token) -> Result<bool> {
        let object_key = self.object_key(key);
        trace!(key = %object_key, "Removing redirect object from Redis");

        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(&object_key).await.map_err(map_redis_error)?;
        Ok(removed > 0)
    }

    async fn head(&self, key: &Token) -> Result<Option<RedirectObject>> {
        let object_key = self.object_key(key);

        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(&object_key).await.map_err(map_redis_error)?;

        if fields.is_empty() {
            return Ok(None);
        }

        parse_object(key.clone(), fields).map(Some)
    }

    async fn keys(&self) -> Result<Vec<Token>> {
        let pattern = format!("{}:*", escape_glob(&self.bucket));
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .arg("TYPE")
                .arg("hash")
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;

            for object_key in batch {
                match key_from_object(&self.bucket, &object_key) {
                    Some(key) => keys.push(key),
                    None => warn!(key = %object_key, "Skipping object with unusable key"),
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Token {
        Token::new(s).unwrap()
    }

    #[test]
    fn parse_public_object() {
        let fields = HashMap::from([
            (LOCATION_FIELD.to_string(), "https://example.com".to_string()),
            (ACL_FIELD.to_string(), "public-read".to_string()),
        ]);

        let object = parse_object(key("abc"), fields).unwrap();
        assert_eq!(object, RedirectObject::public(key("abc"), "https://example.com"));
    }

    #[test]
    fn missing_acl_means_private() {
        let fields = HashMap::from([(LOCATION_FIELD.to_string(), "https://x".to_string())]);

        let object = parse_object(key("abc"), fields).unwrap();
        assert_eq!(object.acl, ObjectAcl::Private);
    }

    #[test]
    fn missing_location_is_invalid() {
        let fields = HashMap::from([(ACL_FIELD.to_string(), "private".to_string())]);

        assert!(matches!(
            parse_object(key("abc"), fields),
            Err(MirrorError::InvalidData(_))
        ));
    }

    #[test]
    fn key_from_object_strips_bucket() {
        assert_eq!(key_from_object("sho.rt", "sho.rt:abc"), Some(key("abc")));
        assert_eq!(key_from_object("sho.rt", "other:abc"), None);
        assert_eq!(key_from_object("sho.rt", "sho.rtabc"), None);
        assert_eq!(key_from_object("sho.rt", "sho.rt:"), None);
    }
}
