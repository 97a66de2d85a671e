//! Command line arguments shared by the service binaries.

use crate::codec::DEFAULT_TOKEN_LENGTH;
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::store::ConfigSource;
use clap::{Args, ValueEnum};
use std::fmt::{Display, Formatter};

pub const CONFIG_SOURCE_ENV: &str = "WAYPOINT_CONFIG_SOURCE";
pub const PREFIX_ENV: &str = "WAYPOINT_PREFIX";
pub const DOMAIN_ENV: &str = "WAYPOINT_DOMAIN";
pub const BUCKET_ENV: &str = "WAYPOINT_BUCKET";
pub const ALPHABET_ENV: &str = "WAYPOINT_ALPHABET";
pub const TOKEN_LENGTH_ENV: &str = "WAYPOINT_TOKEN_LENGTH";
pub const SCHEME_ENV: &str = "WAYPOINT_SCHEME";
pub const PARAMS_ROOT_ENV: &str = "WAYPOINT_PARAMS_ROOT";
pub const NAMESPACE_ROOT_ENV: &str = "WAYPOINT_NAMESPACE_ROOT";

pub const DEFAULT_PARAMS_ROOT: &str = "/urls/params";
pub const DEFAULT_NAMESPACE_ROOT: &str = "/urls";
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Where the service reads its settings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigSourceArg {
    /// Command line flags and `WAYPOINT_*` environment variables.
    #[value(name = "env")]
    Env,
    /// Parameters stored next to the records in the record store.
    #[value(name = "store")]
    Store,
}

impl Display for ConfigSourceArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSourceArg::Env => write!(f, "env"),
            ConfigSourceArg::Store => write!(f, "store"),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    #[arg(long, env = CONFIG_SOURCE_ENV, value_enum, default_value_t = ConfigSourceArg::Env)]
    pub config_source: ConfigSourceArg,

    #[arg(long, env = PREFIX_ENV, required_if_eq("config_source", "env"))]
    pub prefix: Option<String>,

    #[arg(long, env = DOMAIN_ENV, required_if_eq("config_source", "env"))]
    pub domain: Option<String>,

    #[arg(long, env = BUCKET_ENV, required_if_eq("config_source", "env"))]
    pub bucket: Option<String>,

    #[arg(long, env = ALPHABET_ENV, default_value = DEFAULT_ALPHABET)]
    pub alphabet: String,

    #[arg(long, env = TOKEN_LENGTH_ENV, default_value_t = DEFAULT_TOKEN_LENGTH)]
    pub token_length: usize,

    #[arg(long, env = SCHEME_ENV, default_value = "https")]
    pub scheme: String,

    #[arg(long, env = PARAMS_ROOT_ENV, default_value = DEFAULT_PARAMS_ROOT)]
    pub params_root: String,

    #[arg(long, env = NAMESPACE_ROOT_ENV, default_value = DEFAULT_NAMESPACE_ROOT)]
    pub namespace_root: String,
}

impl SettingsArgs {
    /// Settings from flags and environment only.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let settings = Settings::builder()
            .prefix(self.prefix.clone().ok_or(ConfigError::Empty("prefix"))?)
            .domain(self.domain.clone().ok_or(ConfigError::Empty("domain"))?)
            .bucket(self.bucket.clone().ok_or(ConfigError::Empty("bucket"))?)
            .alphabet(self.alphabet.clone())
            .token_length(self.token_length)
            .scheme(self.scheme.clone())
            .build();

        settings.validate()?;
        Ok(settings)
    }

    /// Resolves settings from the configured source.
    ///
    /// `params` is only consulted for [`ConfigSourceArg::Store`].
    pub async fn load<C>(&self, params: &C) -> Result<Settings, ConfigError>
    where
        C: ConfigSource + ?Sized,
    {
        match self.config_source {
            ConfigSourceArg::Env => self.to_settings(),
            ConfigSourceArg::Store => {
                let mut settings =
                    Settings::from_config_source(params, &self.namespace_root).await?;
                settings.scheme = self.scheme.clone();
                settings.validate()?;
                Ok(settings)
            }
        }
    }
}
