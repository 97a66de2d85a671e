use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use waypoint_core::cli::SettingsArgs;
use waypoint_telemetry::cli::TelemetryArgs;

pub const REDIS_URL_ENV: &str = "WAYPOINT_REDIS_URL";
pub const REDIS_DB_ENV: &str = "WAYPOINT_REDIS_DB";
pub const EVENT_SOURCE_ENV: &str = "WAYPOINT_SYNC_EVENT_SOURCE";
pub const ENABLE_NOTIFICATIONS_ENV: &str = "WAYPOINT_SYNC_ENABLE_NOTIFICATIONS";
pub const RECONCILE_INTERVAL_ENV: &str = "WAYPOINT_SYNC_RECONCILE_INTERVAL_SECS";

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventSourceArg {
    /// Redis keyspace notifications for the record namespace.
    #[value(name = "redis")]
    Redis,
    /// JSON change notifications, one per line on stdin.
    #[value(name = "stdin")]
    Stdin,
}

impl Display for EventSourceArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventSourceArg::Redis => write!(f, "redis"),
            EventSourceArg::Stdin => write!(f, "stdin"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waypoint-sync")]
pub struct CLI {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Database index the record store lives in; selects the keyspace channel.
    #[arg(long, env = REDIS_DB_ENV, default_value_t = 0)]
    pub redis_db: i64,

    #[arg(
        long,
        env = EVENT_SOURCE_ENV,
        value_enum,
        default_value_t = EventSourceArg::Redis
    )]
    pub source: EventSourceArg,

    /// Run `CONFIG SET notify-keyspace-events` before subscribing.
    #[arg(long, env = ENABLE_NOTIFICATIONS_ENV)]
    pub enable_notifications: bool,

    /// Seconds between full reconciliations; 0 disables them.
    #[arg(
        long,
        env = RECONCILE_INTERVAL_ENV,
        default_value_t = DEFAULT_RECONCILE_INTERVAL_SECS
    )]
    pub reconcile_interval_secs: u64,

    /// Skip the reconciliation pass on start-up.
    #[arg(long)]
    pub skip_initial_reconcile: bool,
}
