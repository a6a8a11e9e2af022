use std::sync::Arc;

use chrono::NaiveDate;
use common::{BudgetDto, BudgetOverview, BudgetRequest, BudgetStatus, DashboardSummary, MonitoringItem};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::convert::budget_dto;
use crate::error::{LedgerError, Result};
use crate::store::{BudgetStore, ExpenseStore};

/// Allocations at or below this amount are rejected.
pub const MINIMUM_ALLOCATION: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Allocation rules, spend-vs-budget status and the circuit breaker.
#[derive(Clone)]
pub struct BudgetPolicy {
    budgets: Arc<dyn BudgetStore>,
    expenses: Arc<dyn ExpenseStore>,
}

impl BudgetPolicy {
    pub fn new(budgets: Arc<dyn BudgetStore>, expenses: Arc<dyn ExpenseStore>) -> Self {
        Self { budgets, expenses }
    }

    /// Creates or overwrites the allocation for a (category, year).
    #[instrument(skip(self))]
    pub async fn set_allocation(&self, request: BudgetRequest) -> Result<BudgetDto> {
        if request.category_id <= 0 {
            return Err(LedgerError::validation("a valid category is required"));
        }
        if request.amount <= MINIMUM_ALLOCATION {
            return Err(LedgerError::validation(format!(
                "budget amount must be greater than {}",
                MINIMUM_ALLOCATION
            )));
        }
        check_year(request.year)?;

        let saved = self
            .budgets
            .upsert_budget(request.category_id, request.amount, request.year)
            .await?;
        info!(
            "Budget for category {} in {} set to {}",
            saved.category_id, saved.year, saved.amount
        );
        Ok(budget_dto(saved, None))
    }

    /// Budgets of a year, by category name, together with the dashboard.
    pub async fn list(&self, year: i32) -> Result<BudgetOverview> {
        check_year(year)?;
        let rows = self.budgets.budgets_for_year(year).await?;
        let summary = summarize(rows.iter().map(|(b, _)| b.amount));
        let budgets = rows
            .into_iter()
            .map(|(budget, name)| budget_dto(budget, Some(name)))
            .collect();
        Ok(BudgetOverview { budgets, summary })
    }

    pub async fn status(&self, category_id: i32, year: i32) -> Result<BudgetStatus> {
        if category_id <= 0 {
            return Err(LedgerError::validation("a valid category is required"));
        }
        check_year(year)?;
        let Some(budget) = self.budgets.find_budget(category_id, year).await? else {
            debug!("No budget for category {} in {}", category_id, year);
            return Ok(BudgetStatus::default());
        };
        let (from, to) = year_bounds(year)?;
        let spent = self.expenses.total_spent(category_id, from, to).await?;
        Ok(BudgetStatus {
            allocated: budget.amount,
            spent,
            remaining: budget.amount - spent,
            percent: percentage(spent, budget.amount),
            is_locked: budget.is_locked,
        })
    }

    /// Sets the circuit breaker. Setting the current value again is a no-op.
    #[instrument(skip(self))]
    pub async fn set_lock(&self, budget_id: i32, locked: bool) -> Result<BudgetDto> {
        let budget = self
            .budgets
            .set_budget_lock(budget_id, locked)
            .await?
            .ok_or_else(|| LedgerError::not_found("Budget", budget_id))?;
        info!(
            "Spending for category {} in {} locked={}",
            budget.category_id, budget.year, budget.is_locked
        );
        Ok(budget_dto(budget, None))
    }

    pub async fn dashboard(&self, year: i32) -> Result<DashboardSummary> {
        check_year(year)?;
        let rows = self.budgets.budgets_for_year(year).await?;
        Ok(summarize(rows.iter().map(|(b, _)| b.amount)))
    }

    /// One row per budget of the year, ordered by category name.
    pub async fn monitoring(&self, year: i32) -> Result<Vec<MonitoringItem>> {
        check_year(year)?;
        let (from, to) = year_bounds(year)?;
        let rows = self.budgets.budgets_for_year(year).await?;
        let mut items = Vec::with_capacity(rows.len());
        for (budget, category_name) in rows {
            let spent = self
                .expenses
                .total_spent(budget.category_id, from, to)
                .await?;
            items.push(MonitoringItem {
                budget_id: budget.id,
                category_id: budget.category_id,
                category_name,
                budget_amount: budget.amount,
                spent_amount: spent,
                percentage: percentage(spent, budget.amount),
                is_locked: budget.is_locked,
            });
        }
        Ok(items)
    }
}

fn check_year(year: i32) -> Result<()> {
    if year <= 0 {
        return Err(LedgerError::validation("a valid year is required"));
    }
    Ok(())
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1);
    let to = NaiveDate::from_ymd_opt(year, 12, 31);
    from.zip(to)
        .ok_or_else(|| LedgerError::validation(format!("year {} is out of range", year)))
}

/// `part / whole * 100`, zero when `whole` is zero.
pub(crate) fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
}

/// `remaining_budget` is a flat 80% of the total, not the unspent amount.
fn summarize(amounts: impl Iterator<Item = Decimal>) -> DashboardSummary {
    let mut total = Decimal::ZERO;
    let mut highest = Decimal::ZERO;
    for amount in amounts {
        total += amount;
        highest = highest.max(amount);
    }
    DashboardSummary {
        total_annual_budget: total,
        highest_allocation: highest,
        remaining_budget: total * Decimal::new(8, 1),
        savings_target: total * Decimal::new(2, 1),
    }
}
