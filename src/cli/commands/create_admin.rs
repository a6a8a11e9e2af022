use anyhow::Result;
use tracing::info;

use super::initdb::run_migrations;
use crate::config::{build_app_state, connect_with_retry, AppConfig};

pub struct NewAdmin {
    pub username: String,
    pub display_id: String,
    pub email: String,
    pub password: String,
}

/// Creates an active admin account, migrating the database first if needed.
pub async fn create_admin(config: &AppConfig, admin: NewAdmin) -> Result<()> {
    let db = connect_with_retry(config).await?;
    run_migrations(&db).await?;

    let state = build_app_state(db, config);
    let user = state
        .ledger
        .users
        .create_admin(&admin.username, &admin.display_id, &admin.email, &admin.password)
        .await?;

    info!("Admin account {} created for {}", user.id, user.email);
    println!("Created admin {} <{}>", user.username, user.email);
    Ok(())
}
