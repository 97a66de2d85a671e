use crate::error::SyncError;
use crate::service::{SyncOutcome, SyncService};
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;
use waypoint_core::{ChangeEvent, FeedItem, MirrorStore, RecordStore};

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RetryPolicy {
    /// Total attempts per event, including the first.
    #[builder(default = 5)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(100))]
    pub initial_delay: Duration,
    #[builder(default = Duration::from_secs(5))]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Drives a [`SyncService`] from a change stream.
///
/// Reconciles once on start (unless disabled), then handles events in
/// arrival order. A lag report from the feed triggers an immediate
/// reconciliation. Events that keep failing after the retry budget are
/// logged and dropped; the next reconciliation repairs whatever they left
/// behind.
pub struct SyncWorker<R, M> {
    service: Arc<SyncService<R, M>>,
    retry: RetryPolicy,
    initial_reconcile: bool,
    reconcile_interval: Option<Duration>,
}

impl<R: RecordStore, M: MirrorStore> SyncWorker<R, M> {
    pub fn new(service: Arc<SyncService<R, M>>) -> Self {
        Self {
            service,
            retry: RetryPolicy::default(),
            initial_reconcile: true,
            reconcile_interval: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether [`SyncWorker::run`] reconciles before reading events.
    pub fn with_initial_reconcile(mut self, enabled: bool) -> Self {
        self.initial_reconcile = enabled;
        self
    }

    /// Reconcile every `interval` in addition to the start-up pass.
    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = Some(interval);
        self
    }

    /// Handles one event, retrying transient failures.
    pub async fn process(&self, event: &ChangeEvent) -> Result<SyncOutcome, SyncError> {
        let mut attempt = 1;
        loop {
            match self.service.handle(event).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        name = %event.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient sync failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Consumes `events` until the stream ends.
    ///
    /// Accepts plain [`ChangeEvent`] streams as well as [`FeedItem`] streams
    /// that report lag.
    pub async fn run<S>(&self, events: S)
    where
        S: Stream + Send,
        S::Item: Into<FeedItem>,
    {
        if self.initial_reconcile {
            self.reconcile().await;
        }

        let mut ticker = self.reconcile_interval.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        let events = events.fuse();
        tokio::pin!(events);

        info!("Sync worker started");
        loop {
            tokio::select! {
                item = events.next() => match item.map(Into::<FeedItem>::into) {
                    Some(FeedItem::Change(event)) => self.dispatch(&event).await,
                    Some(FeedItem::Lagged(skipped)) => {
                        warn!(skipped, "Change feed lagged, reconciling");
                        self.reconcile().await;
                    }
                    None => break,
                },
                _ = next_tick(&mut ticker) => self.reconcile().await,
            }
        }
        info!("Change stream ended, sync worker stopped");
    }

    async fn dispatch(&self, event: &ChangeEvent) {
        match self.process(event).await {
            Ok(outcome) => debug!(name = %event.name, ?outcome, "Change event handled"),
            Err(e) => error!(
                kind = %event.kind,
                name = %event.name,
                error = %e,
                "Dropping change event after retries"
            ),
        }
    }

    async fn reconcile(&self) {
        if let Err(e) = self.service.reconcile().await {
            error!(error = %e, "Reconciliation failed");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
