use common::{
    BudgetDto, BudgetOverview, BudgetRequest, BudgetStatus, CategoryDto, CategoryRequest,
    CategorySpend, CreateUserRequest, DashboardSummary, DaySpend, ExpenseDto, ExpenseInsights,
    ExpenseRequest, LockRequest, LoginRequest, LoginResponse, MonitoringItem, Role,
    SetPasswordRequest, UpdateRoleRequest, UserDto,
};
use ledger::Ledger;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection, used directly only for health checks
    pub db: DatabaseConnection,
    /// Domain policies backed by the same connection
    pub ledger: Ledger,
}

/// Success envelope around every JSON payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            message: String::new(),
            success: true,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error kind, e.g. `validation_error`
    pub error: String,
    /// Human readable explanation
    pub message: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Only return active categories
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Calendar year, defaults to the current one
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BudgetStatusQuery {
    pub category_id: i32,
    /// Calendar year, defaults to the current one
    pub year: Option<i32>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::set_password,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::toggle_category,
        crate::handlers::budgets::list_budgets,
        crate::handlers::budgets::set_budget,
        crate::handlers::budgets::budget_status,
        crate::handlers::budgets::lock_budget,
        crate::handlers::budgets::monitoring,
        crate::handlers::expenses::list_expenses,
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::delete_expense,
        crate::handlers::expenses::expense_insights,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_role,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            Role,
            CategoryDto,
            CategoryRequest,
            BudgetDto,
            BudgetRequest,
            BudgetOverview,
            BudgetStatus,
            LockRequest,
            DashboardSummary,
            MonitoringItem,
            ExpenseDto,
            ExpenseRequest,
            ExpenseInsights,
            CategorySpend,
            DaySpend,
            UserDto,
            CreateUserRequest,
            UpdateRoleRequest,
            LoginRequest,
            LoginResponse,
            SetPasswordRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, logout and account activation"),
        (name = "categories", description = "Expense categories"),
        (name = "budgets", description = "Annual budgets, spend monitoring and spending locks"),
        (name = "expenses", description = "Expense records and insights"),
        (name = "users", description = "User administration"),
    ),
    info(
        title = "Expense Tracker API",
        description = "Expense tracking with annual category budgets and role-based access. \
            Successful responses are wrapped as `{success, data, message?}`.",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
