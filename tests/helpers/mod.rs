//! Test helpers module
//!
//! Database setup, fixtures and service wiring shared by the integration suites.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;

use ExploreWithMe::database::DatabaseService;
use ExploreWithMe::services::ServiceFactory;

/// Service factory over the test database
pub fn services(db: &TestDatabase, stats_base_url: Option<&str>) -> ServiceFactory {
    let settings = test_settings(&db.database_url, stats_base_url);
    ServiceFactory::new(DatabaseService::new(db.pool.clone()), &settings)
        .expect("Failed to build services")
}
