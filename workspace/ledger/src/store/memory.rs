//! In-process test double for the store traits.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::{budget, category, expense, user};
use rust_decimal::Decimal;

use super::{
    same_category_name, BudgetStore, CategoryStore, ExpenseQuery, ExpenseStore, NewExpense,
    NewUser, UserStore,
};
use crate::error::Result;

#[derive(Default)]
struct Tables {
    categories: Vec<category::Model>,
    budgets: Vec<budget::Model>,
    expenses: Vec<expense::Model>,
    users: Vec<user::Model>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn category_name(&self, id: i32) -> String {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expense_count(&self) -> usize {
        self.tables.lock().unwrap().expenses.len()
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<category::Model>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .categories
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_category(&self, id: i32) -> Result<Option<category::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn category_name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .categories
            .iter()
            .any(|c| same_category_name(&c.name, name) && Some(c.id) != exclude_id))
    }

    async fn insert_category(&self, name: &str, is_active: bool) -> Result<category::Model> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = category::Model {
            id: tables.next_id(),
            name: name.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(row.clone());
        Ok(row)
    }

    async fn update_category(
        &self,
        id: i32,
        name: &str,
        is_active: bool,
    ) -> Result<Option<category::Model>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = name.to_string();
            c.is_active = is_active;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn toggle_category(&self, id: i32) -> Result<Option<category::Model>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.is_active = !c.is_active;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn budgets_for_year(&self, year: i32) -> Result<Vec<(budget::Model, String)>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .budgets
            .iter()
            .filter(|b| b.year == year)
            .map(|b| (b.clone(), tables.category_name(b.category_id)))
            .collect();
        rows.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(rows)
    }

    async fn upsert_budget(
        &self,
        category_id: i32,
        amount: Decimal,
        year: i32,
    ) -> Result<budget::Model> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = tables
            .budgets
            .iter_mut()
            .find(|b| b.category_id == category_id && b.year == year)
        {
            existing.amount = amount;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let row = budget::Model {
            id: tables.next_id(),
            category_id,
            amount,
            year,
            is_locked: false,
            created_at: now,
            updated_at: now,
        };
        tables.budgets.push(row.clone());
        Ok(row)
    }

    async fn find_budget(&self, category_id: i32, year: i32) -> Result<Option<budget::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .budgets
            .iter()
            .find(|b| b.category_id == category_id && b.year == year)
            .cloned())
    }

    async fn set_budget_lock(&self, id: i32, locked: bool) -> Result<Option<budget::Model>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.budgets.iter_mut().find(|b| b.id == id).map(|b| {
            b.is_locked = locked;
            b.updated_at = Utc::now();
            b.clone()
        }))
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn insert_expense(&self, expense: NewExpense) -> Result<expense::Model> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = expense::Model {
            id: tables.next_id(),
            category_id: expense.category_id,
            user_id: expense.user_id,
            amount: expense.amount,
            expense_date: expense.expense_date,
            remarks: expense.remarks,
            created_at: now,
            updated_at: now,
        };
        tables.expenses.push(row.clone());
        Ok(row)
    }

    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<(expense::Model, String)>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .expenses
            .iter()
            .filter(|e| query.matches(e))
            .map(|e| (e.clone(), tables.category_name(e.category_id)))
            .collect();
        rows.sort_by(|a, b| {
            b.0.expense_date
                .cmp(&a.0.expense_date)
                .then(b.0.id.cmp(&a.0.id))
        });
        Ok(rows)
    }

    async fn delete_expense(&self, id: i32) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        Ok((before - tables.expenses.len()) as u64)
    }

    async fn total_spent(&self, category_id: i32, from: NaiveDate, to: NaiveDate) -> Result<Decimal> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .expenses
            .iter()
            .filter(|e| e.category_id == category_id && e.expense_date >= from && e.expense_date <= to)
            .map(|e| e.amount)
            .sum())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<user::Model> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = user::Model {
            id: tables.next_id(),
            username: user.username,
            display_id: user.display_id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            password_set_token: user.password_set_token,
            token_expiry: user.token_expiry,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: i32) -> Result<Option<user::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<user::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| {
                u.password_set_token.as_deref() == Some(token)
                    && u.token_expiry.is_some_and(|expiry| expiry > now)
            })
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<user::Model>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().rev().cloned().collect())
    }

    async fn activate_user(&self, id: i32, password_hash: &str) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(u) = tables.users.iter_mut().find(|u| u.id == id) {
            u.password_hash = password_hash.to_string();
            u.is_active = true;
            u.password_set_token = None;
            u.token_expiry = None;
        }
        Ok(())
    }

    async fn set_user_role(&self, id: i32, role: user::UserRole) -> Result<Option<user::Model>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }
}
