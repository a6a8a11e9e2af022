use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use super::initdb::run_migrations;
use crate::config::{build_app_state, connect_with_retry, AppConfig};
use crate::router::create_router;

pub async fn serve(config: &AppConfig) -> Result<()> {
    trace!("Entering serve function");
    info!("Expense tracker starting up");
    debug!("Bind address: {}", config.bind_address);

    let db = connect_with_retry(config).await?;
    run_migrations(&db).await?;

    let state = build_app_state(db, config);
    if config.seed_default_categories {
        let added = state.ledger.categories.seed_defaults().await?;
        info!("Seeded {} default categories", added);
    }

    // Create router
    trace!("Creating application router");
    let app = create_router(state);
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", config.bind_address);
    let listener = match TcpListener::bind(&config.bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", config.bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", config.bind_address, e);
            return Err(e.into());
        }
    };

    info!("Expense tracker running on http://{}", config.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
