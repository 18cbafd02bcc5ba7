//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the core.

use std::sync::OnceLock;
use chrono::{DateTime, Utc};
use regex::Regex;
use crate::utils::errors::{EwmError, Result};

/// Timestamp layout exchanged with the statistics service
pub const STATS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path prefix used to identify a single event towards the statistics service
pub const EVENT_URI_PREFIX: &str = "/events/";

/// Format a timestamp the way the statistics service expects it
pub fn format_stats_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(STATS_TIMESTAMP_FORMAT).to_string()
}

/// URI under which views of an event are counted
pub fn event_uri(event_id: i64) -> String {
    format!("{}{}", EVENT_URI_PREFIX, event_id)
}

/// Extract the event id from the trailing path segment of a statistics URI
pub fn event_id_from_uri(uri: &str) -> Option<i64> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let pattern = EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    });
    pattern.is_match(email)
}

/// Check that a text field's length (in characters) lies within `min..=max`
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(EwmError::validation(format!(
            "Field '{}' must be between {} and {} characters, got {}",
            field, min, max, length
        )));
    }
    Ok(())
}

/// Check that a required text field is present and not blank
pub fn check_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EwmError::validation(format!("Field '{}' must not be blank", field)));
    }
    Ok(())
}
