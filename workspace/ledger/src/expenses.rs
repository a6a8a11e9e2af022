use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use common::{ExpenseDto, ExpenseFilter, ExpenseInsights, ExpenseRequest};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::auth::Actor;
use crate::convert::expense_dto;
use crate::error::{LedgerError, Result};
use crate::insights;
use crate::store::{BudgetStore, CategoryStore, ExpenseQuery, ExpenseStore, NewExpense};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Recording, listing and analysing expenses on behalf of a user.
///
/// Executives only ever see their own records. Recording checks the
/// category's budget lock first and then inserts; the two steps are not
/// atomic, so an expense racing a lock toggle may still land.
#[derive(Clone)]
pub struct ExpensePolicy {
    categories: Arc<dyn CategoryStore>,
    budgets: Arc<dyn BudgetStore>,
    expenses: Arc<dyn ExpenseStore>,
}

impl ExpensePolicy {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        budgets: Arc<dyn BudgetStore>,
        expenses: Arc<dyn ExpenseStore>,
    ) -> Self {
        Self {
            categories,
            budgets,
            expenses,
        }
    }

    #[instrument(skip(self, request), fields(actor = actor.id))]
    pub async fn create(&self, request: ExpenseRequest, actor: &Actor) -> Result<ExpenseDto> {
        if !actor.role.can_enter_expenses() {
            warn!("{} tried to record an expense", actor.role);
            return Err(LedgerError::Forbidden(
                "only executives and admins can enter expenses".to_string(),
            ));
        }
        if request.category_id <= 0 {
            return Err(LedgerError::validation("a valid category is required"));
        }
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::validation("amount must be greater than zero"));
        }
        let raw_date = request.expense_date.trim();
        if raw_date.is_empty() {
            return Err(LedgerError::validation("expense date is required"));
        }
        let expense_date = parse_date("expense date", raw_date)?;

        let category = self
            .categories
            .get_category(request.category_id)
            .await?
            .ok_or_else(|| LedgerError::validation("category does not exist"))?;

        if let Some(budget) = self
            .budgets
            .find_budget(category.id, expense_date.year())
            .await?
        {
            if budget.is_locked {
                warn!(
                    "Rejected expense for locked category {} in {}",
                    category.id, budget.year
                );
                return Err(LedgerError::Locked(
                    "spending is temporarily locked for this category".to_string(),
                ));
            }
        }

        let created = self
            .expenses
            .insert_expense(NewExpense {
                category_id: category.id,
                user_id: Some(actor.id),
                amount: request.amount,
                expense_date,
                remarks: request.remarks.trim().to_string(),
            })
            .await?;
        info!("Recorded expense {} of {}", created.id, created.amount);
        Ok(expense_dto(created, Some(category.name)))
    }

    pub async fn list(&self, filter: &ExpenseFilter, actor: &Actor) -> Result<Vec<ExpenseDto>> {
        let query = scoped_query(filter, actor)?;
        let rows = self.expenses.list_expenses(&query).await?;
        debug!("Listing {} expenses", rows.len());
        Ok(rows
            .into_iter()
            .map(|(expense, name)| expense_dto(expense, Some(name)))
            .collect())
    }

    /// Deletes an expense. Deleting an id that does not exist is a no-op.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<()> {
        if id <= 0 {
            return Err(LedgerError::validation("a valid expense id is required"));
        }
        let removed = self.expenses.delete_expense(id).await?;
        debug!("Deleted {} expense rows for id {}", removed, id);
        Ok(())
    }

    pub async fn insights(&self, filter: &ExpenseFilter, actor: &Actor) -> Result<ExpenseInsights> {
        let query = scoped_query(filter, actor)?;
        let rows = self.expenses.list_expenses(&query).await?;

        let previous_total = match (query.start_date, query.end_date) {
            (Some(start), Some(end)) => match insights::previous_window(start, end) {
                Some((prev_start, prev_end)) => {
                    let previous = ExpenseQuery {
                        start_date: Some(prev_start),
                        end_date: Some(prev_end),
                        ..query.clone()
                    };
                    self.expenses
                        .list_expenses(&previous)
                        .await?
                        .iter()
                        .map(|(e, _)| e.amount)
                        .sum()
                }
                None => Decimal::ZERO,
            },
            _ => Decimal::ZERO,
        };

        Ok(insights::summarize(&rows, previous_total))
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        LedgerError::validation(format!("{} must be a valid date (YYYY-MM-DD)", field))
    })
}

fn positive(id: Option<i32>) -> Option<i32> {
    id.filter(|id| *id > 0)
}

/// Turns the raw filter into a query, restricting executives to their own
/// records whatever user they asked for.
fn scoped_query(filter: &ExpenseFilter, actor: &Actor) -> Result<ExpenseQuery> {
    let start_date = filter
        .start_date
        .as_deref()
        .map(|raw| parse_date("start date", raw))
        .transpose()?;
    let end_date = filter
        .end_date
        .as_deref()
        .map(|raw| parse_date("end date", raw))
        .transpose()?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(LedgerError::validation(
                "start date must not be after end date",
            ));
        }
    }
    if let (Some(min), Some(max)) = (filter.min_amount, filter.max_amount) {
        if min > max {
            return Err(LedgerError::validation(
                "minimum amount must not exceed maximum amount",
            ));
        }
    }

    let user_id = if actor.role.can_view_all_expenses() {
        positive(filter.user_id)
    } else {
        Some(actor.id)
    };

    Ok(ExpenseQuery {
        start_date,
        end_date,
        category_id: positive(filter.category_id),
        user_id,
        search: filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase),
        min_amount: filter.min_amount,
        max_amount: filter.max_amount,
    })
}
