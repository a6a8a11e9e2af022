use crate::auth::SESSION_COOKIE;
use crate::router::create_router;
use crate::schemas::AppState;
use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::Utc;
use common::Role;
use ledger::{Ledger, LedgerSettings};
use migration::{Migrator, MigratorTrait};
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    let ledger = Ledger::with_database(db.clone(), LedgerSettings::default());
    AppState { db, ledger }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from RUST_LOG and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// A test server over a fresh database, plus the state behind it.
pub async fn setup_test_server() -> (TestServer, AppState) {
    let _guard = init_test_tracing();
    let state = setup_test_app_state().await;
    let server = TestServer::new(create_router(state.clone())).expect("Failed to start test server");
    (server, state)
}

/// Inserts an active user with the given role and opens a session for it.
///
/// Returns the user id and a `Cookie` header value carrying the session.
/// Passwords are bypassed to keep tests fast.
pub async fn login_as(state: &AppState, role: Role, email: &str) -> (i32, HeaderValue) {
    let now = Utc::now();
    let user_role = match role {
        Role::Admin => UserRole::Admin,
        Role::Management => UserRole::Management,
        Role::Executive => UserRole::Executive,
    };
    let created = user::ActiveModel {
        username: Set(email.split('@').next().unwrap_or(email).to_string()),
        display_id: Set(format!("EMP-{}", email.len())),
        email: Set(email.to_string()),
        password_hash: Set(String::new()),
        role: Set(user_role),
        is_active: Set(true),
        password_set_token: Set(None),
        token_expiry: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("Failed to create test user");

    let token = state.ledger.auth.sessions().issue(created.id).await;
    let cookie = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token))
        .expect("Invalid cookie value");
    (created.id, cookie)
}
