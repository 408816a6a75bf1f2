//! Process configuration.
//!
//! Sources, later ones overriding earlier: built-in defaults, an optional
//! `homeworkd.toml` in the working directory, then `HOMEWORKD_*` environment
//! variables (`HOMEWORKD_LOG_LEVEL`, `HOMEWORKD_LOG_FORMAT`,
//! `HOMEWORKD_WORKSPACE`). `RUST_LOG` wins over the configured level.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Workspace opened before the first request, if set.
    #[serde(default)]
    pub workspace: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("log_level", "info")?
            .set_default("log_format", "compact")?
            .add_source(File::with_name("homeworkd").required(false))
            .add_source(Environment::with_prefix("HOMEWORKD").try_parsing(true))
            .set_override_option("log_level", std::env::var("RUST_LOG").ok())?
            .build()?;
        config.try_deserialize()
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            workspace: None,
        }
    }
}
