//! Services module
//!
//! This module contains business logic services

pub mod stats;
pub mod event;
pub mod request;
pub mod rating;
pub mod user;
pub mod category;

// Re-export commonly used services
pub use stats::{StatsClient, HitRequest, ViewStats};
pub use event::EventService;
pub use request::RequestService;
pub use rating::{RatingService, RatingUpdate};
pub use user::UserService;
pub use category::CategoryService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::state::EventRules;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub request_service: RequestService,
    pub rating_service: RatingService,
    pub user_service: UserService,
    pub category_service: CategoryService,
    db: DatabaseService,
    stats: StatsClient,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: &Settings) -> Result<Self> {
        let stats = StatsClient::new(&settings.stats)?;
        let rules = EventRules::from(&settings.rules);

        Ok(Self {
            event_service: EventService::new(db.clone(), stats.clone(), rules),
            request_service: RequestService::new(db.clone()),
            rating_service: RatingService::new(db.clone()),
            user_service: UserService::new(db.users.clone()),
            category_service: CategoryService::new(db.categories.clone()),
            db,
            stats,
        })
    }

    /// Health check for all collaborators
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let (database, stats) = futures::join!(self.db.health_check(), self.stats.health_check());

        ServiceHealthStatus {
            database_healthy: database.is_ok(),
            stats_enabled: self.stats.is_enabled(),
            stats_healthy: stats,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub stats_enabled: bool,
    pub stats_healthy: bool,
}

impl ServiceHealthStatus {
    /// The database is the only hard dependency; statistics are best-effort
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if self.stats_enabled && !self.stats_healthy {
            issues.push("Statistics service unreachable".to_string());
        }

        issues
    }
}
