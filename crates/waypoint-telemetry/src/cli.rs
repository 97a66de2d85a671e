use crate::{LogFormat, TelemetryConfig};
use clap::Args;

pub const LOG_FORMAT_ENV: &str = "WAYPOINT_LOG_FORMAT";
pub const LOG_FILTER_ENV: &str = "WAYPOINT_LOG_FILTER";
pub const OTLP_ENDPOINT_ENV: &str = "WAYPOINT_OTLP_ENDPOINT";

#[derive(Debug, Clone, Args)]
pub struct TelemetryArgs {
    /// `pretty` or `json`.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Filter directives used when `RUST_LOG` is unset.
    #[arg(long, env = LOG_FILTER_ENV, default_value = "info")]
    pub log_filter: String,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryArgs {
    pub fn to_config(&self, service_name: &str) -> TelemetryConfig {
        TelemetryConfig {
            service_name: service_name.to_string(),
            format: self.log_format,
            default_filter: self.log_filter.clone(),
            otlp_endpoint: self.otlp_endpoint.clone(),
        }
    }
}
