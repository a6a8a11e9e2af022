//! Domain core of the expense tracker.
//!
//! The policies here own every business rule: category naming, budget
//! allocation and locking, expense authorship and visibility, accounts and
//! sessions. They talk to persistence only through the traits in [`store`].

pub mod auth;
pub mod budgets;
pub mod categories;
mod convert;
pub mod error;
pub mod expenses;
pub mod insights;
pub mod mailer;
pub mod password;
pub mod session;
pub mod store;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use auth::AuthPolicy;
use budgets::BudgetPolicy;
use categories::CategoryPolicy;
use expenses::ExpensePolicy;
use mailer::{LogMailer, Mailer};
use session::SessionStore;
use store::{DbStore, Store};
use users::UserPolicy;

pub use auth::Actor;
pub use error::{LedgerError, Result};

/// Runtime knobs for [`Ledger`].
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub session_ttl: Duration,
    /// Prefix for links sent by mail, e.g. `https://expenses.example.com`.
    pub public_base_url: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(86_400),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// All policies wired to one store.
#[derive(Clone)]
pub struct Ledger {
    pub categories: CategoryPolicy,
    pub budgets: BudgetPolicy,
    pub expenses: ExpensePolicy,
    pub users: UserPolicy,
    pub auth: AuthPolicy,
}

impl Ledger {
    pub fn new<S>(store: Arc<S>, mailer: Arc<dyn Mailer>, settings: LedgerSettings) -> Self
    where
        S: Store + 'static,
    {
        Self {
            categories: CategoryPolicy::new(store.clone()),
            budgets: BudgetPolicy::new(store.clone(), store.clone()),
            expenses: ExpensePolicy::new(store.clone(), store.clone(), store.clone()),
            users: UserPolicy::new(store.clone(), mailer, settings.public_base_url),
            auth: AuthPolicy::new(store, SessionStore::new(settings.session_ttl)),
        }
    }

    /// A ledger backed by the database that logs outgoing mail.
    pub fn with_database(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self::new(Arc::new(DbStore::new(db)), Arc::new(LogMailer), settings)
    }
}
