//! Exporter settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `HISTWATCH_*` environment variables.
//!
//! ```toml
//! endpoint = "https://aggregates.telemetry.mozilla.org"
//! output_dir = "histograms"
//! lanes = 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use histwatch_telemetry::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES};
use histwatch_types::{DEFAULT_VERSION_COUNT, NIGHTLY_PREFIX};

use crate::ExportError;

/// Environment variable prefix, e.g. `HISTWATCH_LANES=4`.
pub const ENV_PREFIX: &str = "HISTWATCH";

/// Settings for one export run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// Base URL of the telemetry aggregation service.
    pub endpoint: String,
    /// Directory receiving one `<metric>.json` per metric.
    pub output_dir: PathBuf,
    /// Only versions whose identifier starts with this are exported.
    pub channel_prefix: String,
    /// How many of the most recent matching versions to export.
    pub version_count: usize,
    /// Number of metrics processed at once.
    pub lanes: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub log_level: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_dir: PathBuf::from("histograms"),
            channel_prefix: NIGHTLY_PREFIX.to_string(),
            version_count: DEFAULT_VERSION_COUNT,
            lanes: 3,
            timeout_secs: 30,
            max_retries: DEFAULT_MAX_RETRIES,
            log_level: "info".to_string(),
        }
    }
}

impl ExportConfig {
    /// Load settings from defaults, an optional config file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ExportError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ExportError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("endpoint", defaults.endpoint)?
            .set_default("output_dir", defaults.output_dir.to_string_lossy().into_owned())?
            .set_default("channel_prefix", defaults.channel_prefix)?
            .set_default("version_count", defaults.version_count as u64)?
            .set_default("lanes", defaults.lanes as u64)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("max_retries", defaults.max_retries as u64)?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config: ExportConfig = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if self.lanes == 0 {
            return Err(ExportError::Config("lanes must be at least 1".into()));
        }
        if self.version_count == 0 {
            return Err(ExportError::Config("version_count must be at least 1".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ExportError::Config("endpoint must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
