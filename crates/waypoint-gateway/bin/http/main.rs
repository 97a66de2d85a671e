mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::{anyhow, Context};
use clap::Parser;
use futures_util::Stream;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use waypoint_core::cli::ConfigSourceArg;
use waypoint_core::{FeedItem, MirrorStore, RecordStore, Settings};
use waypoint_gateway::{App, AppState};
use waypoint_mirror::{InMemoryBucket, RedisBucket};
use waypoint_shortener::WriteService;
use waypoint_storage::{InMemoryRecordStore, RedisChangeFeed, RedisRecordStore};
use waypoint_sync::{SyncService, SyncWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    let _telemetry = waypoint_telemetry::init(&config.telemetry.to_config("waypoint-gateway"))?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        config_source = %config.settings.config_source,
        "starting gateway server"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            if config.settings.config_source == ConfigSourceArg::Store {
                return Err(anyhow!(
                    "store-sourced configuration needs the redis storage backend"
                ));
            }
            let settings = config.settings.to_settings()?;
            let store = Arc::new(InMemoryRecordStore::new(settings.namespace()));
            let mirror = Arc::new(InMemoryBucket::new());

            let events = store.changes();
            spawn_sync(&config, &settings, Arc::clone(&store), Arc::clone(&mirror), events);
            serve(&config, &settings, store, mirror).await
        }
        StorageBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .clone()
                .context("redis url is required when storage backend is redis")?;
            let client = redis::Client::open(redis_url.as_str())
                .with_context(|| format!("invalid redis url '{redis_url}'"))?;
            let conn = client
                .get_multiplexed_async_connection()
                .await
                .context("failed to connect to redis")?;

            let params_root = config.settings.params_root.clone();
            let params = waypoint_storage::RedisParameters::new(conn.clone(), &params_root);
            let settings = config.settings.load(&params).await?;

            let store = Arc::new(RedisRecordStore::new(
                conn.clone(),
                settings.namespace(),
                &params_root,
            ));
            let mirror = Arc::new(RedisBucket::new(conn, settings.bucket.clone()));

            if config.embedded_sync {
                let feed = RedisChangeFeed::new(client, settings.namespace(), config.redis_db);
                let events = feed.subscribe().await?;
                spawn_sync(&config, &settings, Arc::clone(&store), Arc::clone(&mirror), events);
            }
            serve(&config, &settings, store, mirror).await
        }
    }
}

fn spawn_sync<R, M, S>(config: &CLI, settings: &Settings, store: Arc<R>, mirror: Arc<M>, events: S)
where
    R: RecordStore,
    M: MirrorStore,
    S: Stream + Send + 'static,
    S::Item: Into<FeedItem> + Send,
{
    let service = SyncService::new(store, mirror, settings.namespace());
    let mut worker = SyncWorker::new(Arc::new(service));
    if config.reconcile_interval_secs > 0 {
        worker = worker.with_reconcile_interval(Duration::from_secs(config.reconcile_interval_secs));
    }

    info!("starting embedded sync worker");
    tokio::spawn(async move { worker.run(events).await });
}

async fn serve<R, M>(config: &CLI, settings: &Settings, store: Arc<R>, mirror: Arc<M>) -> anyhow::Result<()>
where
    R: RecordStore,
    M: MirrorStore,
{
    let links = WriteService::new(store, settings.codec()?, settings.public_url());
    let state = AppState::new(Arc::new(links), mirror);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
}
