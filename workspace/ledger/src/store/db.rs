use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::{budget, category, expense, prelude::*, user};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use super::{
    same_category_name, BudgetStore, CategoryStore, ExpenseQuery, ExpenseStore, NewExpense,
    NewUser, UserStore,
};
use crate::error::{LedgerError, Result};

/// SeaORM-backed implementation of every store.
#[derive(Debug, Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStore for DbStore {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<category::Model>> {
        let mut query = Category::find();
        if active_only {
            query = query.filter(category::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?)
    }

    async fn get_category(&self, id: i32) -> Result<Option<category::Model>> {
        Ok(Category::find_by_id(id).one(&self.db).await?)
    }

    // SQLite's lower() only folds ASCII, so names are compared here.
    async fn category_name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Category::find()
            .select_only()
            .column(category::Column::Id)
            .column(category::Column::Name);
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }
        let names: Vec<(i32, String)> = query.into_tuple().all(&self.db).await?;
        Ok(names
            .iter()
            .any(|(_, existing)| same_category_name(existing, name)))
    }

    #[instrument(skip(self))]
    async fn insert_category(&self, name: &str, is_active: bool) -> Result<category::Model> {
        let now = Utc::now();
        let created = category::ActiveModel {
            name: Set(name.to_string()),
            is_active: Set(is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted category {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        id: i32,
        name: &str,
        is_active: bool,
    ) -> Result<Option<category::Model>> {
        let Some(existing) = Category::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(name.to_string());
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }

    #[instrument(skip(self))]
    async fn toggle_category(&self, id: i32) -> Result<Option<category::Model>> {
        let Some(existing) = Category::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let flipped = !existing.is_active;
        let mut active = existing.into_active_model();
        active.is_active = Set(flipped);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }
}

#[async_trait]
impl BudgetStore for DbStore {
    async fn budgets_for_year(&self, year: i32) -> Result<Vec<(budget::Model, String)>> {
        let rows = Budget::find()
            .filter(budget::Column::Year.eq(year))
            .find_also_related(Category)
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        trace!("Loaded {} budgets for {}", rows.len(), year);
        Ok(rows
            .into_iter()
            .map(|(budget, category)| {
                let name = category.map(|c| c.name).unwrap_or_default();
                (budget, name)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn upsert_budget(
        &self,
        category_id: i32,
        amount: Decimal,
        year: i32,
    ) -> Result<budget::Model> {
        let now = Utc::now();
        let row = budget::ActiveModel {
            category_id: Set(category_id),
            amount: Set(amount),
            year: Set(year),
            is_locked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Budget::insert(row)
            .on_conflict(
                OnConflict::columns([budget::Column::CategoryId, budget::Column::Year])
                    .update_columns([budget::Column::Amount, budget::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Budget::find_for(category_id, year)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::Internal("budget vanished after upsert".to_string()))
    }

    async fn find_budget(&self, category_id: i32, year: i32) -> Result<Option<budget::Model>> {
        Ok(Budget::find_for(category_id, year).one(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn set_budget_lock(&self, id: i32, locked: bool) -> Result<Option<budget::Model>> {
        let Some(existing) = Budget::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.is_locked = Set(locked);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }
}

#[async_trait]
impl ExpenseStore for DbStore {
    #[instrument(skip(self))]
    async fn insert_expense(&self, expense: NewExpense) -> Result<expense::Model> {
        let now = Utc::now();
        let created = expense::ActiveModel {
            category_id: Set(expense.category_id),
            user_id: Set(expense.user_id),
            amount: Set(expense.amount),
            expense_date: Set(expense.expense_date),
            remarks: Set(expense.remarks),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted expense {}", created.id);
        Ok(created)
    }

    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<(expense::Model, String)>> {
        let mut select = Expense::find();
        if let Some(start) = query.start_date {
            select = select.filter(expense::Column::ExpenseDate.gte(start));
        }
        if let Some(end) = query.end_date {
            select = select.filter(expense::Column::ExpenseDate.lte(end));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(expense::Column::CategoryId.eq(category_id));
        }
        if let Some(user_id) = query.user_id {
            select = select.filter(expense::Column::UserId.eq(user_id));
        }
        if let Some(min) = query.min_amount {
            select = select.filter(expense::Column::Amount.gte(min));
        }
        if let Some(max) = query.max_amount {
            select = select.filter(expense::Column::Amount.lte(max));
        }

        let rows = select
            .find_also_related(Category)
            .order_by_desc(expense::Column::ExpenseDate)
            .order_by_desc(expense::Column::Id)
            .all(&self.db)
            .await?;
        trace!("Loaded {} expenses", rows.len());
        // Remarks are matched here rather than with LIKE, which treats % and _
        // as wildcards and folds ASCII only.
        Ok(rows
            .into_iter()
            .filter(|(expense, _)| query.remarks_match(&expense.remarks))
            .map(|(expense, category)| {
                let name = category.map(|c| c.name).unwrap_or_default();
                (expense, name)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_expense(&self, id: i32) -> Result<u64> {
        let result = Expense::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn total_spent(&self, category_id: i32, from: NaiveDate, to: NaiveDate) -> Result<Decimal> {
        let amounts: Vec<Decimal> = Expense::find()
            .select_only()
            .column(expense::Column::Amount)
            .filter(expense::Column::CategoryId.eq(category_id))
            .filter(expense::Column::ExpenseDate.between(from, to))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(amounts.into_iter().sum())
    }
}

#[async_trait]
impl UserStore for DbStore {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: NewUser) -> Result<user::Model> {
        let now = Utc::now();
        let created = user::ActiveModel {
            username: Set(user.username),
            display_id: Set(user.display_id),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            is_active: Set(user.is_active),
            password_set_token: Set(user.password_set_token),
            token_expiry: Set(user.token_expiry),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        debug!("Inserted user {}", created.id);
        Ok(created)
    }

    async fn get_user(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(User::find_by_id(id).one(&self.db).await?)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn user_by_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::PasswordSetToken.eq(token))
            .filter(user::Column::TokenExpiry.gt(now))
            .one(&self.db)
            .await?)
    }

    async fn list_users(&self) -> Result<Vec<user::Model>> {
        Ok(User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    #[instrument(skip(self, password_hash))]
    async fn activate_user(&self, id: i32, password_hash: &str) -> Result<()> {
        let existing = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("User", id))?;
        let mut active = existing.into_active_model();
        active.password_hash = Set(password_hash.to_string());
        active.is_active = Set(true);
        active.password_set_token = Set(None);
        active.token_expiry = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_user_role(&self, id: i32, role: user::UserRole) -> Result<Option<user::Model>> {
        let Some(existing) = User::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.role = Set(role);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }
}
