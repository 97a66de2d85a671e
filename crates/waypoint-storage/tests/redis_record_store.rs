use futures_util::StreamExt;
use redis::AsyncCommands;
use std::time::Duration;
use waypoint_core::{ChangeEvent, ConfigSource, Namespace, RecordStore, Token};
use waypoint_storage::{RedisChangeFeed, RedisRecordStore};
use waypoint_test_infra::redis::RedisServer;

const PREFIX: &str = "/urls/links";
const PARAMS_ROOT: &str = "/urls/params";

fn token(s: &str) -> Token {
    Token::new(s).unwrap()
}

async fn store(server: &RedisServer) -> RedisRecordStore {
    let conn = server.connection().await.expect("Failed to connect to Redis");
    RedisRecordStore::new(conn, Namespace::new(PREFIX), PARAMS_ROOT)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn put_get_delete() {
    let server = RedisServer::start().await.unwrap();
    let store = store(&server).await;

    assert!(store.get(&token("abc")).await.unwrap().is_none());

    store.put(&token("abc"), "https://example.com").await.unwrap();
    let record = store.get(&token("abc")).await.unwrap().unwrap();
    assert_eq!(record.destination_url, "https://example.com");
    assert!(record.modified_at.is_some());

    assert!(store.delete(&token("abc")).await.unwrap());
    assert!(!store.delete(&token("abc")).await.unwrap());
    assert!(store.get(&token("abc")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_only_returns_namespace_records() {
    let server = RedisServer::start().await.unwrap();
    let store = store(&server).await;
    let mut conn = server.connection().await.unwrap();

    store.put(&token("a"), "https://a.com").await.unwrap();
    store.put(&token("b"), "https://b.com").await.unwrap();
    conn.hset::<_, _, _, ()>("/urls/other/c", "value", "https://c.com")
        .await
        .unwrap();
    conn.hset::<_, _, _, ()>("/urls/links/nested/d", "value", "https://d.com")
        .await
        .unwrap();
    conn.set::<_, _, ()>("/urls/links/plain", "not a hash")
        .await
        .unwrap();

    let mut tokens: Vec<Token> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.token)
        .collect();
    tokens.sort();

    assert_eq!(tokens, vec![token("a"), token("b")]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn reads_configuration_parameters() {
    let server = RedisServer::start().await.unwrap();
    let store = store(&server).await;
    let mut conn = server.connection().await.unwrap();

    conn.set::<_, _, ()>("/urls/params/dom", "sho.rt").await.unwrap();

    assert_eq!(
        store.get_config("dom").await.unwrap().as_deref(),
        Some("sho.rt")
    );
    assert_eq!(store.get_config("chars").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn change_feed_reports_writes_and_deletes() {
    let server = RedisServer::start().await.unwrap();
    let store = store(&server).await;
    let feed = RedisChangeFeed::open(server.url(), Namespace::new(PREFIX), 0).unwrap();

    let events = feed.subscribe().await.unwrap();
    tokio::pin!(events);

    store.put(&token("abc"), "https://example.com").await.unwrap();
    store.delete(&token("abc")).await.unwrap();

    let created = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .expect("no create notification")
        .unwrap();
    assert_eq!(created, ChangeEvent::create("/urls/links/abc"));

    let deleted = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .expect("no delete notification")
        .unwrap();
    assert_eq!(deleted, ChangeEvent::delete("/urls/links/abc"));
}
