use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use waypoint_core::cli::SettingsArgs;
use waypoint_telemetry::cli::TelemetryArgs;

pub const LISTEN_ADDR_ENV: &str = "WAYPOINT_GATEWAY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "WAYPOINT_GATEWAY_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "WAYPOINT_REDIS_URL";
pub const REDIS_DB_ENV: &str = "WAYPOINT_REDIS_DB";
pub const EMBEDDED_SYNC_ENV: &str = "WAYPOINT_GATEWAY_EMBEDDED_SYNC";
pub const RECONCILE_INTERVAL_ENV: &str = "WAYPOINT_SYNC_RECONCILE_INTERVAL_SECS";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waypoint-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_DB_ENV, default_value_t = 0)]
    pub redis_db: i64,

    /// Run the sync worker inside the gateway process. Always on for the
    /// in-memory backend, whose change feed is process-local.
    #[arg(long, env = EMBEDDED_SYNC_ENV)]
    pub embedded_sync: bool,

    /// Seconds between full reconciliations of the embedded worker; 0 disables them.
    #[arg(
        long,
        env = RECONCILE_INTERVAL_ENV,
        default_value_t = DEFAULT_RECONCILE_INTERVAL_SECS
    )]
    pub reconcile_interval_secs: u64,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,
}
