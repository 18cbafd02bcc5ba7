//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EwmError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_stats_config(&settings.stats)?;
    validate_rules_config(&settings.rules)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EwmError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EwmError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EwmError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(EwmError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    if config.idle_timeout_seconds == Some(0) || config.max_lifetime_seconds == Some(0) {
        return Err(EwmError::Config(
            "Idle timeout and max lifetime must be greater than 0 when set".to_string()
        ));
    }

    Ok(())
}

/// Validate statistics client configuration
fn validate_stats_config(config: &super::StatsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.base_url.is_empty() {
        return Err(EwmError::Config(
            "Statistics base URL is required".to_string()
        ));
    }

    url::Url::parse(&config.base_url)?;

    if config.app_name.is_empty() {
        return Err(EwmError::Config(
            "Statistics app name is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EwmError::Config(
            "Statistics timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate event scheduling rules
fn validate_rules_config(config: &super::RulesConfig) -> Result<()> {
    if config.min_lead_time_minutes < 0 {
        return Err(EwmError::Config(
            "Minimum lead time cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EwmError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EwmError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_pool_sizes() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(EwmError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_pool_timeouts() {
        let mut settings = Settings::default();
        settings.database.max_lifetime_seconds = Some(0);
        assert_matches!(validate_settings(&settings), Err(EwmError::Config(_)));

        let mut settings = Settings::default();
        settings.database.idle_timeout_seconds = None;
        settings.database.max_lifetime_seconds = None;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_malformed_stats_url() {
        let mut settings = Settings::default();
        settings.stats.base_url = "not a url".to_string();
        assert_matches!(validate_settings(&settings), Err(EwmError::UrlParse(_)));
    }

    #[test]
    fn test_disabled_stats_skips_checks() {
        let mut settings = Settings::default();
        settings.stats.enabled = false;
        settings.stats.base_url = String::new();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(EwmError::Config(_)));
    }
}
