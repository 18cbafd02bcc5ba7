//! ExploreWithMe event core
//!
//! Deployment entry point: applies migrations and reports collaborator health

use anyhow::Context;
use tracing::{info, warn, error};

use ExploreWithMe::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, create_pool, run_migrations},
    services::ServiceFactory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file appender on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", ExploreWithMe::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(database_service, &settings)?;

    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Health check issue");
    }

    if !health.is_healthy() {
        error!("Core is not healthy, exiting");
        anyhow::bail!("health check failed: {:?}", health.get_issues());
    }

    info!(
        stats_enabled = health.stats_enabled,
        stats_healthy = health.stats_healthy,
        "Core is ready"
    );

    Ok(())
}
