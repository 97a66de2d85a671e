use crate::error::map_redis_error;
use waypoint_core::glob::escape_glob;
use async_trait::async_trait;
use jiff::Timestamp;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, trace, warn};
use waypoint_core::{ConfigSource, Namespace, RecordStore, ShortLinkRecord, StoreError, Token};

type Result<T> = std::result::Result<T, StoreError>;

const VALUE_FIELD: &str = "value";
const MODIFIED_AT_FIELD: &str = "modified_at";
const SCAN_BATCH: usize = 500;

/// Shared configuration parameters stored as plain string keys
/// (`<root>/<name>`), next to the record namespace.
#[derive(Debug, Clone)]
pub struct RedisParameters {
    conn: MultiplexedConnection,
    root: String,
}

impl RedisParameters {
    pub fn new(conn: MultiplexedConnection, root: impl Into<String>) -> Self {
        Self {
            conn,
            root: root.into().trim_end_matches('/').to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{}", self.root, name)
    }
}

#[async_trait]
impl ConfigSource for RedisParameters {
    async fn get_config(&self, name: &str) -> Result<Option<String>> {
        let key = self.key(name);
        trace!(key = %key, "Reading configuration parameter");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(&key)
            .await
            .map_err(map_redis_error)
    }
}

/// Redis-backed record store.
///
/// Each record is a hash at its full path name (`prefix/token`) with a
/// `value` field holding the destination URL and a `modified_at` field in
/// unix seconds. Writes use a single `HSET` so a put surfaces as one `hset`
/// keyspace notification.
#[derive(Debug, Clone)]
pub struct RedisRecordStore {
    conn: MultiplexedConnection,
    namespace: Namespace,
    params: RedisParameters,
}

impl RedisRecordStore {
    /// Creates a store from an existing connection.
    pub fn new(conn: MultiplexedConnection, namespace: Namespace, params_root: &str) -> Self {
        let params = RedisParameters::new(conn.clone(), params_root);
        Self {
            conn,
            namespace,
            params,
        }
    }

    /// Opens a new multiplexed connection and creates a store on it.
    pub async fn connect(redis_url: &str, namespace: Namespace, params_root: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(map_redis_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;
        Ok(Self::new(conn, namespace, params_root))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Lists record paths under the namespace. Only hashes are returned, so
    /// unrelated keys sharing the prefix are skipped.
    async fn scan_paths(&self) -> Result<Vec<String>> {
        let pattern = format!("{}/*", escape_glob(self.namespace.prefix()));
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut paths = Vec::new();

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

            paths.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(paths)
    }
}

fn parse_record(token: Token, mut fields: HashMap<String, String>) -> Result<ShortLinkRecord> {
    let destination_url = fields.remove(VALUE_FIELD).ok_or_else(|| {
        StoreError::InvalidData(format!("record '{}' has no '{}' field", token, VALUE_FIELD))
    })?;

    let modified_at = fields
        .get(MODIFIED_AT_FIELD)
        .map(String::as_str)
        .map(parse_modified_at)
        .transpose()?;

    Ok(ShortLinkRecord {
        token,
        destination_url,
        modified_at,
    })
}

fn parse_modified_at(raw: &str) -> Result<Timestamp> {
    let seconds: i64 = raw.parse().map_err(|e| {
        StoreError::InvalidData(format!("invalid modified_at '{}': {e}", raw))
    })?;
    Timestamp::from_second(seconds)
        .map_err(|e| StoreError::InvalidData(format!("invalid modified_at '{}': {e}", raw)))
}

#[async_trait]
impl ConfigSource for RedisRecordStore {
    async fn get_config(&self, name: &str) -> Result<Option<String>> {
        self.params.get_config(name).await
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn put(&self, token: &Token, destination_url: &str) -> Result<()> {
        let path = self.namespace.path_for(token);
        trace!(path = %path, "Writing record to Redis");

        let fields = [
            (VALUE_FIELD, destination_url.to_string()),
            (MODIFIED_AT_FIELD, Timestamp::now().as_second().to_string()),
        ];

        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(&path, &fields[..])
            .await
            .map_err(map_redis_error)?;

        debug!(path = %path, "Stored record in Redis");
        Ok(())
    }

    async fn get(&self, token: &Token) -> Result<Option<ShortLinkRecord>> {
        let path = self.namespace.path_for(token);
        trace!(path = %path, "Reading record from Redis");

        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(&path).await.map_err(map_redis_error)?;

        if fields.is_empty() {
            trace!(path = %path, "Record not found");
            return Ok(None);
        }

        parse_record(token.clone(), fields).map(Some)
    }

    async fn delete(&self, token: &Token) -> Result<bool> {
        let path = self.namespace.path_for(token);
        trace!(path = %path, "Deleting record from Redis");

        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(&path).await.map_err(map_redis_error)?;
        Ok(removed > 0)
    }

    async fn list(&self) -> Result<Vec<ShortLinkRecord>> {
        let tokens: Vec<(String, Token)> = self
            .scan_paths()
            .await?
            .into_iter()
            .filter_map(|path| {
                let token = self.namespace.token_from_path(&path)?;
                Some((path, token))
            })
            .collect();

        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for (path, _) in &tokens {
            pipe.hgetall(path);
        }

        let mut conn = self.conn.clone();
        let rows: Vec<HashMap<String, String>> =
            pipe.query_async(&mut conn).await.map_err(map_redis_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for ((path, token), fields) in tokens.into_iter().zip(rows) {
            // Deleted between SCAN and HGETALL.
            if fields.is_empty() {
                continue;
            }
            match parse_record(token, fields) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path, error = %e, "Skipping malformed record"),
            }
        }

        Ok(records)
    }
}
