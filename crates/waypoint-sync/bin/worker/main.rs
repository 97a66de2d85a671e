mod cli;

use crate::cli::{EventSourceArg, CLI};
use anyhow::Context;
use clap::Parser;
use futures_util::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use waypoint_core::ChangeEvent;
use waypoint_mirror::RedisBucket;
use waypoint_storage::{RedisChangeFeed, RedisParameters, RedisRecordStore};
use waypoint_sync::{parse_event, SyncService, SyncWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    let _telemetry = waypoint_telemetry::init(&config.telemetry.to_config("waypoint-sync"))?;

    let client = redis::Client::open(config.redis_url.as_str())
        .with_context(|| format!("invalid redis url '{}'", config.redis_url))?;
    let conn = client
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to redis")?;

    let params = RedisParameters::new(conn.clone(), &config.settings.params_root);
    let settings = config.settings.load(&params).await?;
    let namespace = settings.namespace();

    info!(
        prefix = %namespace.prefix(),
        bucket = %settings.bucket,
        source = %config.source,
        reconcile_interval_secs = config.reconcile_interval_secs,
        "starting sync worker"
    );

    let store = Arc::new(RedisRecordStore::new(
        conn.clone(),
        namespace.clone(),
        &config.settings.params_root,
    ));
    let mirror = Arc::new(RedisBucket::new(conn, settings.bucket.clone()));
    let service = Arc::new(SyncService::new(store, mirror, namespace.clone()));

    let mut worker =
        SyncWorker::new(service).with_initial_reconcile(!config.skip_initial_reconcile);
    if config.reconcile_interval_secs > 0 {
        worker = worker.with_reconcile_interval(Duration::from_secs(config.reconcile_interval_secs));
    }

    match config.source {
        EventSourceArg::Redis => {
            let feed = RedisChangeFeed::new(client, namespace, config.redis_db);
            if config.enable_notifications {
                feed.enable_notifications().await?;
            }
            let events = feed.subscribe().await?;
            run_until_shutdown(&worker, events).await
        }
        EventSourceArg::Stdin => run_until_shutdown(&worker, stdin_events()).await,
    }
}

async fn run_until_shutdown<S>(
    worker: &SyncWorker<RedisRecordStore, RedisBucket>,
    events: S,
) -> anyhow::Result<()>
where
    S: Stream<Item = ChangeEvent> + Send,
{
    tokio::select! {
        _ = worker.run(events) => Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Change notifications read as JSON lines from stdin.
fn stdin_events() -> impl Stream<Item = ChangeEvent> + Send {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    futures_util::stream::unfold(lines, |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match parse_event(&line) {
                    Ok(Some(event)) => return Some((event, lines)),
                    Ok(None) => debug!(line = %line, "skipping notification without a value change"),
                    Err(e) => warn!(error = %e, line = %line, "skipping malformed notification"),
                },
                Ok(None) => return None,
                Err(e) => {
                    error!(error = %e, "failed to read stdin");
                    return None;
                }
            }
        }
    })
}
