use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use ledger::{Ledger, LedgerSettings};
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::schemas::AppState;

/// Application settings.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `expense-tracker.toml` in the working directory, then environment
/// variables (`DATABASE_URL`, `BIND_ADDRESS`, ...). `.env` is loaded into the
/// environment beforehand. Command line flags override all of these.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Lifetime of a login session
    pub session_ttl_secs: u64,
    pub db_connect_attempts: u32,
    pub db_connect_delay_secs: u64,
    /// Base of the links mailed to new users
    pub public_base_url: String,
    /// Create the default categories on startup
    pub seed_default_categories: bool,
}

// Hand written so logging the config never leaks database credentials.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &redact_credentials(&self.database_url))
            .field("bind_address", &self.bind_address)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("db_connect_attempts", &self.db_connect_attempts)
            .field("db_connect_delay_secs", &self.db_connect_delay_secs)
            .field("public_base_url", &self.public_base_url)
            .field("seed_default_categories", &self.seed_default_categories)
            .finish()
    }
}

/// Replaces the `user:password@` part of a connection URL.
fn redact_credentials(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***{}", &url[..scheme_end], &rest[at..]),
        None => url.to_string(),
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://expense-tracker.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("session_ttl_secs", 86_400)?
            .set_default("db_connect_attempts", 5)?
            .set_default("db_connect_delay_secs", 2)?
            .set_default("public_base_url", "http://localhost:8080")?
            .set_default("seed_default_categories", true)?
            .add_source(File::with_name("expense-tracker").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

/// Connects to the database, retrying a bounded number of times so the
/// service can start alongside its database.
pub async fn connect_with_retry(config: &AppConfig) -> Result<DatabaseConnection> {
    let attempts = config.db_connect_attempts.max(1);
    let delay = Duration::from_secs(config.db_connect_delay_secs);

    let mut attempt = 1;
    loop {
        info!("Connecting to database (attempt {}/{})", attempt, attempts);
        match Database::connect(&config.database_url).await {
            Ok(db) => {
                info!("Successfully connected to database");
                return Ok(db);
            }
            Err(e) if attempt < attempts => {
                warn!("Database connection failed: {}. Retrying in {:?}", e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("could not connect to database after {} attempts", attempts)
                });
            }
        }
    }
}

/// Wires the ledger onto an open connection.
pub fn build_app_state(db: DatabaseConnection, config: &AppConfig) -> AppState {
    let ledger = Ledger::with_database(db.clone(), config.ledger_settings());
    AppState { db, ledger }
}
