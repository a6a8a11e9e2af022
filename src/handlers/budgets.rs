use axum::{
    extract::State,
    response::Json,
};
use chrono::{Datelike, Utc};
use common::{BudgetDto, BudgetOverview, BudgetRequest, BudgetStatus, LockRequest, MonitoringItem};
use tracing::{info, instrument};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::schemas::{ApiResponse, AppState, BudgetStatusQuery, YearQuery};

fn year_or_current(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| Utc::now().year())
}

/// Budgets of a year with the dashboard summary
#[utoipa::path(
    get,
    path = "/api/budgets",
    tag = "budgets",
    params(YearQuery),
    responses(
        (status = 200, description = "Budgets ordered by category name", body = BudgetOverview),
        (status = 400, description = "Invalid year", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_budgets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> ApiResult<Json<ApiResponse<BudgetOverview>>> {
    let overview = state
        .ledger
        .budgets
        .list(year_or_current(query.year))
        .await?;
    Ok(Json(ApiResponse::ok(overview)))
}

/// Set the allocation of a category for a year
///
/// Overwrites the amount of an existing budget and leaves its lock alone.
#[utoipa::path(
    post,
    path = "/api/budgets",
    tag = "budgets",
    request_body = BudgetRequest,
    responses(
        (status = 200, description = "Budget saved", body = BudgetDto),
        (status = 400, description = "Amount not above 10000, or invalid category or year", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn set_budget(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BudgetRequest>,
) -> ApiResult<Json<ApiResponse<BudgetDto>>> {
    let budget = state.ledger.budgets.set_allocation(request).await?;
    Ok(Json(ApiResponse::with_message(budget, "budget saved")))
}

/// Spend against allocation for one category
#[utoipa::path(
    get,
    path = "/api/budgets/status",
    tag = "budgets",
    params(BudgetStatusQuery),
    responses(
        (status = 200, description = "Status; all zero when no budget exists", body = BudgetStatus)
    )
)]
#[instrument(skip(state))]
pub async fn budget_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BudgetStatusQuery>,
) -> ApiResult<Json<ApiResponse<BudgetStatus>>> {
    let status = state
        .ledger
        .budgets
        .status(query.category_id, year_or_current(query.year))
        .await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// Switch the spending lock of a budget on or off
#[utoipa::path(
    post,
    path = "/api/budgets/{id}/lock",
    tag = "budgets",
    params(("id" = i32, Path, description = "Budget ID")),
    request_body = LockRequest,
    responses(
        (status = 200, description = "Lock updated", body = BudgetDto),
        (status = 404, description = "Budget not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn lock_budget(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<LockRequest>,
) -> ApiResult<Json<ApiResponse<BudgetDto>>> {
    let budget = state.ledger.budgets.set_lock(id, request.is_locked).await?;
    let message = if budget.is_locked {
        "spending locked"
    } else {
        "spending unlocked"
    };
    info!("Budget {}: {}", budget.id, message);
    Ok(Json(ApiResponse::with_message(budget, message)))
}

/// Budget-vs-spend report for a year
#[utoipa::path(
    get,
    path = "/api/monitoring",
    tag = "budgets",
    params(YearQuery),
    responses(
        (status = 200, description = "One row per budget, ordered by category name", body = Vec<MonitoringItem>)
    )
)]
#[instrument(skip(state))]
pub async fn monitoring(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> ApiResult<Json<ApiResponse<Vec<MonitoringItem>>>> {
    let items = state
        .ledger
        .budgets
        .monitoring(year_or_current(query.year))
        .await?;
    Ok(Json(ApiResponse::ok(items)))
}
