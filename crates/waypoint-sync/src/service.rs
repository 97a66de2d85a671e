use crate::error::SyncError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, trace};
use waypoint_core::{
    ChangeEvent, ChangeKind, MirrorStore, Namespace, ObjectAcl, RecordStore, Token,
};

/// What handling one change event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The event named something outside the record namespace.
    Ignored,
    /// The current record was written to the mirror.
    Published,
    /// A create event whose record is already gone. A later delete event
    /// (or reconciliation) removes the object.
    SkippedMissing,
    /// The object was removed; `existed` is false if there was none.
    Unpublished { existed: bool },
}

/// Counts from a full reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub published: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Applies record store changes to the mirror.
///
/// Create events never trust a payload: the handler re-reads the record at
/// processing time, so replays and reordered deliveries settle on whatever
/// the store holds now.
#[derive(Debug)]
pub struct SyncService<R, M> {
    store: Arc<R>,
    mirror: Arc<M>,
    namespace: Namespace,
}

impl<R: RecordStore, M: MirrorStore> SyncService<R, M> {
    pub fn new(store: Arc<R>, mirror: Arc<M>, namespace: Namespace) -> Self {
        Self {
            store,
            mirror,
            namespace,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub async fn handle(&self, event: &ChangeEvent) -> Result<SyncOutcome, SyncError> {
        let Some(key) = self.namespace.token_from_path(&event.name) else {
            debug!(name = %event.name, "Ignoring change outside the record namespace");
            return Ok(SyncOutcome::Ignored);
        };

        trace!(kind = %event.kind, key = %key, "Handling change event");

        match event.kind {
            ChangeKind::Create => self.publish_current(&key).await,
            ChangeKind::Delete => {
                let existed = self.mirror.unpublish(&key).await?;
                info!(key = %key, existed, "Unpublished redirect");
                Ok(SyncOutcome::Unpublished { existed })
            }
        }
    }

    async fn publish_current(&self, key: &Token) -> Result<SyncOutcome, SyncError> {
        match self.store.get(key).await? {
            Some(record) => {
                self.mirror.publish(key, &record.destination_url).await?;
                info!(key = %key, location = %record.destination_url, "Published redirect");
                Ok(SyncOutcome::Published)
            }
            None => {
                debug!(key = %key, "Record gone before publish, skipping");
                Ok(SyncOutcome::SkippedMissing)
            }
        }
    }

    /// Rebuilds the mirror from the record store.
    ///
    /// The listing only picks which keys to visit. Every key, listed or found
    /// in the mirror, is settled against a fresh `get`, so records written
    /// or removed after the listing was taken are never clobbered with a
    /// stale value or unpublished while live.
    pub async fn reconcile(&self) -> Result<ReconcileReport, SyncError> {
        let listed = self.store.list().await?;
        let mut report = ReconcileReport::default();
        let mut visited = HashSet::with_capacity(listed.len());

        for record in listed {
            self.converge(&record.token, &mut report).await?;
            visited.insert(record.token);
        }

        for key in self.mirror.keys().await? {
            if !visited.contains(&key) {
                self.converge(&key, &mut report).await?;
            }
        }

        info!(
            published = report.published,
            unchanged = report.unchanged,
            removed = report.removed,
            "Reconciled mirror"
        );
        Ok(report)
    }

    /// Makes the object for `key` match the record the store holds now.
    async fn converge(&self, key: &Token, report: &mut ReconcileReport) -> Result<(), SyncError> {
        let Some(record) = self.store.get(key).await? else {
            if self.mirror.unpublish(key).await? {
                debug!(key = %key, "Removed orphaned redirect");
                report.removed += 1;
            }
            return Ok(());
        };

        let up_to_date = self.mirror.head(key).await?.is_some_and(|object| {
            object.location == record.destination_url && object.acl == ObjectAcl::PublicRead
        });

        if up_to_date {
            report.unchanged += 1;
        } else {
            self.mirror.publish(key, &record.destination_url).await?;
            debug!(key = %key, location = %record.destination_url, "Republished redirect");
            report.published += 1;
        }
        Ok(())
    }
}
