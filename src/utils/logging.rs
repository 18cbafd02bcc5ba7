//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ExploreWithMe core.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{EwmError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender when dropped and must be held
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EwmError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "ewm.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };

    let json_layer = config.json.then(|| fmt::layer().json());
    let plain_layer = (!config.json).then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EwmError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event lifecycle actions
pub fn log_event_action(event_id: i64, action: &str, actor_id: Option<i64>, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        actor_id = actor_id,
        details = details,
        "Event action performed"
    );
}

/// Log participation request decisions
pub fn log_admission_decision(event_id: i64, request_id: i64, status: &str, confirmed_requests: i32) {
    info!(
        event_id = event_id,
        request_id = request_id,
        status = status,
        confirmed_requests = confirmed_requests,
        "Participation request decided"
    );
}

/// Log rating recomputation results
pub fn log_rating_change(subject: &str, subject_id: i64, old_rating: i64, new_rating: i64) {
    info!(
        subject = subject,
        subject_id = subject_id,
        old_rating = old_rating,
        new_rating = new_rating,
        "Rating recomputed"
    );
}

/// Log a swallowed statistics service failure
pub fn log_stats_failure(operation: &str, error: &str) {
    warn!(
        api = "stats",
        operation = operation,
        error = error,
        "Statistics service call failed, continuing without view counts"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
