//! Transport-layer types shared between the HTTP handlers and the domain
//! crate. Amounts are `rust_decimal::Decimal` and serialize as strings.

mod reports;
mod role;

pub use reports::{
    BudgetStatus, CategorySpend, DashboardSummary, DaySpend, ExpenseInsights, MonitoringItem,
};
pub use role::Role;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

// ===================== Categories =====================

/// Request for creating or replacing a category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryRequest {
    pub name: String,
    /// Defaults to `true` when omitted.
    pub is_active: Option<bool>,
}

/// Category response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===================== Budgets =====================

/// Request for setting the allocation of a category for a year.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetRequest {
    pub category_id: i32,
    pub amount: Decimal,
    pub year: i32,
}

/// Body of the circuit breaker endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LockRequest {
    pub is_locked: bool,
}

/// Budget response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetDto {
    pub id: i32,
    pub category_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub amount: Decimal,
    pub year: i32,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budgets of one year together with the dashboard figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetOverview {
    pub budgets: Vec<BudgetDto>,
    pub summary: DashboardSummary,
}

// ===================== Expenses =====================

/// Request for recording an expense.
///
/// `expense_date` is kept as the raw `YYYY-MM-DD` string so that format
/// problems surface as validation errors rather than body rejections.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseRequest {
    pub category_id: i32,
    pub amount: Decimal,
    pub expense_date: String,
    #[serde(default)]
    pub remarks: String,
}

/// Search criteria for listing expenses and computing insights.
///
/// Blank query values are treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, PartialEq, Default)]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilter {
    /// Inclusive lower bound (YYYY-MM-DD)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_date: Option<String>,
    /// Inclusive upper bound (YYYY-MM-DD)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category_id: Option<i32>,
    /// Ignored for executives, who only ever see their own records
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_id: Option<i32>,
    /// Case-insensitive substring of the remarks
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_amount: Option<Decimal>,
}

/// Query strings carry every value as text, and HTML forms submit untouched
/// inputs as empty strings.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Expense response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseDto {
    pub id: i32,
    pub category_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub user_id: Option<i32>,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub remarks: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===================== Users =====================

/// Request for creating a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateUserRequest {
    pub username: String,
    pub display_id: String,
    pub email: String,
    /// Defaults to executive.
    pub role: Option<String>,
}

/// Request for changing the role of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpdateRoleRequest {
    pub user_id: i32,
    pub role: String,
}

/// User response model. Secrets never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub display_id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===================== Auth =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_request_defaults_remarks() {
        let json = r#"{"category_id": 1, "amount": "12000", "expense_date": "2026-03-01"}"#;
        let request: ExpenseRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.remarks, "");
        assert_eq!(request.amount, Decimal::new(12_000, 0));
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        let json = r#"{"category_id": 1, "amount": 50000.5, "year": 2026}"#;
        let request: BudgetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.amount, Decimal::new(500_005, 1));
    }

    #[test]
    fn test_filter_treats_blank_values_as_absent() {
        let filter: ExpenseFilter = serde_json::from_value(serde_json::json!({
            "start_date": "",
            "category_id": " ",
            "search": "taxi",
            "min_amount": "100.50"
        }))
        .unwrap();
        assert_eq!(filter.start_date, None);
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.search.as_deref(), Some("taxi"));
        assert_eq!(filter.min_amount, Some(Decimal::new(10_050, 2)));
    }

    #[test]
    fn test_filter_rejects_malformed_numbers() {
        let result: Result<ExpenseFilter, _> =
            serde_json::from_value(serde_json::json!({ "user_id": "abc" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_budget_dto_omits_missing_category_name() {
        let dto = BudgetDto {
            id: 1,
            category_id: 2,
            category_name: None,
            amount: Decimal::new(20_000, 0),
            year: 2026,
            is_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&dto).unwrap();
        assert!(value.get("category_name").is_none());
        assert_eq!(value["amount"], "20000");
    }
}
