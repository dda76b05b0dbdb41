//! Configuration management for GridWatch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level node configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Broker connection settings
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Reconnect/backoff policy
    #[serde(default)]
    pub retry: RetryConfig,
    /// Snapshot reporting settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Path to the facility metadata catalog (TOML)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

/// MQTT broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker hostname or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client id prefix; the process id is appended to avoid collisions
    pub client_id_prefix: String,
    /// Topic carrying facility telemetry
    pub topic: String,
    /// MQTT keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// Window a connect attempt may take before counting as a failure
    pub connect_timeout_secs: u64,
}

/// Reconnect policy: exponential backoff with a cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// First backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_backoff_ms: u64,
    /// Consecutive failures tolerated before giving up; `None` retries forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// Periodic snapshot reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Seconds between fleet status reports
    pub interval_secs: u64,
    /// Age beyond which a facility reading counts as stale, in seconds
    pub stale_after_secs: u64,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("facilities.toml")
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id_prefix: "gridwatch-node".to_string(),
            topic: "gridwatch/facilities".to_string(),
            keep_alive_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15,
            stale_after_secs: 300,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file. Missing sections fall back to
    /// their defaults, so a partial file is valid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Built-in defaults, used when no config file is supplied.
    pub fn default_config() -> Self {
        Self {
            broker: BrokerConfig::default(),
            retry: RetryConfig::default(),
            report: ReportConfig::default(),
            catalog_path: default_catalog_path(),
        }
    }
}
