//! PostgreSQL pool setup, schema migrations and liveness check

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Instant;
use tracing::{debug, info};
use crate::config::DatabaseConfig;
use crate::utils::errors::Result;

pub type DatabasePool = PgPool;

/// Pool options derived from the database section of the settings
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
}

/// Open the pool and make sure the server answers before handing it out
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool> {
    let pool = pool_options(config).connect(&config.url).await?;
    health_check(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        idle_timeout_seconds = config.idle_timeout_seconds,
        max_lifetime_seconds = config.max_lifetime_seconds,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply pending migrations from `migrations/`
pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    let started = Instant::now();

    migrator.run(pool).await?;

    info!(
        known_migrations = migrator.iter().count(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Schema is up to date"
    );
    Ok(())
}

/// Round trip to the server
pub async fn health_check(pool: &DatabasePool) -> Result<()> {
    let started = Instant::now();
    sqlx::query("SELECT 1").execute(pool).await?;
    debug!(latency_ms = started.elapsed().as_millis() as u64, "Database answered");
    Ok(())
}
