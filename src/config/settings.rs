//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub stats: StatsConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Idle connections are closed after this long; `None` keeps them open
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: Option<u64>,
    /// Connections are recycled after this long; `None` keeps them forever
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: Option<u64>,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime_seconds.map(Duration::from_secs)
    }
}

/// Statistics service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    pub base_url: String,
    pub app_name: String,
    pub timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Event scheduling rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Minimum interval between submission/edit and the event date
    pub min_lead_time_minutes: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> Option<u64> {
    Some(600)
}

fn default_max_lifetime() -> Option<u64> {
    Some(1800)
}

fn default_true() -> bool {
    true
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_lead_time_minutes: 120,
        }
    }
}

impl RulesConfig {
    pub fn min_lead_time(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.min_lead_time_minutes)
    }
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific file (extension optional) layered under the environment
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("EWM").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EwmError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/ewm".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: default_acquire_timeout(),
                idle_timeout_seconds: default_idle_timeout(),
                max_lifetime_seconds: default_max_lifetime(),
            },
            stats: StatsConfig {
                base_url: "http://stats-server:9090".to_string(),
                app_name: "ewm-main-service".to_string(),
                timeout_seconds: 5,
                enabled: true,
            },
            rules: RulesConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
        }
    }
}
