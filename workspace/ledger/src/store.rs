//! Persistence contracts used by the policies.
//!
//! Each store covers one aggregate. Policies only hold the stores they need,
//! so tests can swap in [`memory::MemoryStore`] for the database.

mod db;
#[cfg(test)]
pub(crate) mod memory;

pub use db::DbStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::{budget, category, expense, user};
use rust_decimal::Decimal;

use crate::error::Result;

/// Validated expense search. Every `None` means "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub user_id: Option<i32>,
    /// Lower-cased substring of the remarks
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl ExpenseQuery {
    /// Checks a single record against every criterion.
    pub fn matches(&self, expense: &expense::Model) -> bool {
        self.start_date.is_none_or(|d| expense.expense_date >= d)
            && self.end_date.is_none_or(|d| expense.expense_date <= d)
            && self.category_id.is_none_or(|c| expense.category_id == c)
            && self.user_id.is_none_or(|u| expense.user_id == Some(u))
            && self.min_amount.is_none_or(|m| expense.amount >= m)
            && self.max_amount.is_none_or(|m| expense.amount <= m)
            && self.remarks_match(&expense.remarks)
    }

    /// Plain substring match, case folded the same way as `search`.
    pub fn remarks_match(&self, remarks: &str) -> bool {
        self.search
            .as_deref()
            .is_none_or(|s| remarks.to_lowercase().contains(s))
    }
}

/// Case-insensitive category name comparison, Unicode aware.
pub(crate) fn same_category_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category_id: i32,
    pub user_id: Option<i32>,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub display_id: String,
    pub email: String,
    pub role: user::UserRole,
    pub password_hash: String,
    pub is_active: bool,
    pub password_set_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Categories ordered by name.
    async fn list_categories(&self, active_only: bool) -> Result<Vec<category::Model>>;
    async fn get_category(&self, id: i32) -> Result<Option<category::Model>>;
    /// Whether another category already uses `name`, ignoring case.
    async fn category_name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool>;
    async fn insert_category(&self, name: &str, is_active: bool) -> Result<category::Model>;
    async fn update_category(
        &self,
        id: i32,
        name: &str,
        is_active: bool,
    ) -> Result<Option<category::Model>>;
    /// Flips `is_active`.
    async fn toggle_category(&self, id: i32) -> Result<Option<category::Model>>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Budgets of `year` with their category names, ordered by category name.
    async fn budgets_for_year(&self, year: i32) -> Result<Vec<(budget::Model, String)>>;
    /// Creates the (category, year) budget or overwrites its amount.
    /// The lock flag of an existing row is left alone.
    async fn upsert_budget(&self, category_id: i32, amount: Decimal, year: i32)
    -> Result<budget::Model>;
    async fn find_budget(&self, category_id: i32, year: i32) -> Result<Option<budget::Model>>;
    async fn set_budget_lock(&self, id: i32, locked: bool) -> Result<Option<budget::Model>>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert_expense(&self, expense: NewExpense) -> Result<expense::Model>;
    /// Matching expenses with their category names, newest first.
    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<(expense::Model, String)>>;
    /// Returns the number of rows removed.
    async fn delete_expense(&self, id: i32) -> Result<u64>;
    /// Sum of the category's expenses dated within `[from, to]`.
    async fn total_spent(&self, category_id: i32, from: NaiveDate, to: NaiveDate) -> Result<Decimal>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<user::Model>;
    async fn get_user(&self, id: i32) -> Result<Option<user::Model>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<user::Model>>;
    /// The user holding `token`, provided it has not expired at `now`.
    async fn user_by_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<user::Model>>;
    /// Newest accounts first.
    async fn list_users(&self) -> Result<Vec<user::Model>>;
    /// Stores the hash, activates the account and burns the token.
    async fn activate_user(&self, id: i32, password_hash: &str) -> Result<()>;
    async fn set_user_role(&self, id: i32, role: user::UserRole) -> Result<Option<user::Model>>;
}

/// Everything the ledger needs from persistence.
pub trait Store: CategoryStore + BudgetStore + ExpenseStore + UserStore {}

impl<T> Store for T where T: CategoryStore + BudgetStore + ExpenseStore + UserStore {}
