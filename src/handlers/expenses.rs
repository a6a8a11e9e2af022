use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use common::{ExpenseDto, ExpenseFilter, ExpenseInsights, ExpenseRequest};
use tracing::{debug, instrument};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::schemas::{ApiResponse, AppState};

/// List expenses
///
/// Executives only see their own expenses; `user_id` is ignored for them.
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Matching expenses, newest first", body = Vec<ExpenseDto>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user = user.0.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(filter): ApiQuery<ExpenseFilter>,
) -> ApiResult<Json<ApiResponse<Vec<ExpenseDto>>>> {
    let expenses = state.ledger.expenses.list(&filter, &user.actor()).await?;
    debug!("Returning {} expenses", expenses.len());
    Ok(Json(ApiResponse::ok(expenses)))
}

/// Record an expense for the logged in user
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "expenses",
    request_body = ExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseDto),
        (status = 400, description = "Invalid expense", body = ErrorResponse),
        (status = 403, description = "Role may not record expenses, or spending is locked", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user = user.0.id))]
pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ExpenseDto>>)> {
    let expense = state.ledger.expenses.create(request, &user.actor()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(expense, "expense recorded")),
    ))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "expenses",
    params(("id" = i32, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 400, description = "Invalid id", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.ledger.expenses.delete(id).await?;
    Ok(Json(ApiResponse::with_message((), "expense deleted")))
}

/// Spend analytics over the filtered expenses
///
/// The previous period is only compared when both dates are given.
#[utoipa::path(
    get,
    path = "/api/expenses/insights",
    tag = "expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Insights", body = ExpenseInsights),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user = user.0.id))]
pub async fn expense_insights(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(filter): ApiQuery<ExpenseFilter>,
) -> ApiResult<Json<ApiResponse<ExpenseInsights>>> {
    let insights = state.ledger.expenses.insights(&filter, &user.actor()).await?;
    Ok(Json(ApiResponse::ok(insights)))
}
