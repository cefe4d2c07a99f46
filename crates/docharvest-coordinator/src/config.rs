//! Configuration for harvesting
//!
//! Loads settings from TOML: the adapter binding, the remote API endpoints
//! and the coordinator schedule.

use docharvest_client::ApiConfig;
use docharvest_source::AdapterSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Longest schedule a worker accepts: one year
const MAX_SCANNING_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Schedule and limits of the coordinator
///
/// # Examples
///
/// ```
/// use docharvest_coordinator::CoordinatorConfig;
///
/// // Default: every 6 hours
/// let config = CoordinatorConfig::default();
/// assert_eq!(config.scanning_interval_minutes, 360);
///
/// // Frequent: every 15 minutes
/// let config = CoordinatorConfig::frequent();
/// assert_eq!(config.scanning_interval_minutes, 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How often to scan every tracked source (in minutes)
    /// Default: 360 (6 hours)
    #[serde(default = "default_scanning_interval")]
    pub scanning_interval_minutes: u64,

    /// Upper bound for one source scan (in seconds)
    /// Default: 120
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,

    /// Refresh decorations before each scheduled pass
    /// Default: true
    #[serde(default = "default_refresh_decorations")]
    pub refresh_decorations: bool,
}

fn default_scanning_interval() -> u64 {
    360
}

fn default_scan_timeout() -> u64 {
    120
}

fn default_refresh_decorations() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            scanning_interval_minutes: default_scanning_interval(),
            scan_timeout_secs: default_scan_timeout(),
            refresh_decorations: default_refresh_decorations(),
        }
    }
}

impl CoordinatorConfig {
    /// Short interval for busy documents
    pub fn frequent() -> Self {
        Self {
            scanning_interval_minutes: 15,
            scan_timeout_secs: 60,
            refresh_decorations: false,
        }
    }

    /// Once a day
    pub fn relaxed() -> Self {
        Self {
            scanning_interval_minutes: 24 * 60,
            scan_timeout_secs: 300,
            refresh_decorations: true,
        }
    }

    /// Get scanning interval as Duration
    ///
    /// Clamped to between one minute and one year.
    pub fn scanning_interval(&self) -> Duration {
        let minutes = self
            .scanning_interval_minutes
            .clamp(1, MAX_SCANNING_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    /// Get scan timeout as Duration
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

/// Complete configuration of a harvesting process
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Adapter binding
    pub adapter: AdapterSettings,

    /// Remote API endpoints
    pub api: ApiConfig,

    /// Schedule and limits
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

impl HarvestConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: HarvestConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every mandatory field is present and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self
            .adapter
            .missing_fields()
            .into_iter()
            .map(|f| format!("adapter.{}", f))
            .chain(self.api.missing_fields().into_iter().map(|f| format!("api.{}", f)))
            .collect::<Vec<_>>();

        if let Some(first) = missing.into_iter().next() {
            return Err(ConfigError::MissingField(first));
        }

        if self.coordinator.scanning_interval_minutes == 0 {
            return Err(ConfigError::MissingField(
                "coordinator.scanning_interval_minutes (must be > 0)".to_string(),
            ));
        }

        Ok(())
    }

    /// Configuration for the public paperhive.org instance
    pub fn paperhive() -> Self {
        Self {
            adapter: AdapterSettings::paperhive(),
            api: ApiConfig::paperhive(),
            coordinator: CoordinatorConfig::default(),
        }
    }
}
