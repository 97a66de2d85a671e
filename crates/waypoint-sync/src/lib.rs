//! Keeps the redirect bucket in step with the record store.
//!
//! [`SyncService`] is the per-event handler. [`SyncWorker`] feeds it from a
//! change stream with retries and periodic reconciliation.

pub mod envelope;
pub mod error;
pub mod service;
pub mod worker;

pub use envelope::parse_event;
pub use error::SyncError;
pub use service::{ReconcileReport, SyncOutcome, SyncService};
pub use worker::{RetryPolicy, SyncWorker};
