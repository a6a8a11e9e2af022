use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

use crate::config::{connect_with_retry, AppConfig};

/// Applies every pending migration.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    trace!("Executing migration up command");
    match Migrator::up(db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
            debug!("All pending migrations have been applied");
            Ok(())
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            Err(e.into())
        }
    }
}

pub async fn init_database(config: &AppConfig) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    let db = connect_with_retry(config).await?;
    run_migrations(&db).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
