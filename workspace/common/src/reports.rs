//! Aggregate views over budgets and expenses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Spend against allocation for one category in one year.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct BudgetStatus {
    pub allocated: Decimal,
    pub spent: Decimal,
    /// `allocated - spent`; negative once the budget is overrun.
    pub remaining: Decimal,
    /// `spent / allocated * 100`, or zero when nothing is allocated.
    pub percent: Decimal,
    pub is_locked: bool,
}

/// Headline numbers for the budgets dashboard.
///
/// `remaining_budget` is a flat 80% of the total and does not account for
/// actual spend; see [`BudgetStatus::remaining`] for the per-category figure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct DashboardSummary {
    pub total_annual_budget: Decimal,
    pub highest_allocation: Decimal,
    pub remaining_budget: Decimal,
    pub savings_target: Decimal,
}

/// One row of the budget-vs-spend monitoring report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonitoringItem {
    pub budget_id: i32,
    pub category_id: i32,
    pub category_name: String,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    pub percentage: Decimal,
    pub is_locked: bool,
}

/// Total spend for one category inside an insights window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategorySpend {
    pub category_id: i32,
    pub category_name: String,
    pub total: Decimal,
    pub count: i64,
}

/// Spend grouped by weekday. `day` is 0 for Sunday through 6 for Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DaySpend {
    pub day: u32,
    pub day_name: String,
    pub total: Decimal,
    pub count: i64,
}

/// Spend analytics over a filtered set of expenses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct ExpenseInsights {
    pub total_spent: Decimal,
    pub transaction_count: i64,
    pub average_expense: Decimal,
    pub previous_period_total: Decimal,
    pub spending_change: Decimal,
    pub top_categories: Vec<CategorySpend>,
    pub spending_by_day: Vec<DaySpend>,
}
