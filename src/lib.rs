//! ExploreWithMe event core
//!
//! Event lifecycle, capacity-bounded participation requests and vote-based
//! ratings on top of PostgreSQL. The library is embedded by thin API layers;
//! the statistics service is reached through an HTTP client.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod query;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EwmError, ErrorKind, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use query::{EventFilter, EventPredicate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
