use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use common::{CategoryDto, CategoryRequest};
use tracing::{debug, instrument};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::schemas::{ApiResponse, AppState, CategoryListQuery};

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = Vec<CategoryDto>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Management or admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<CategoryDto>>>> {
    let categories = state.ledger.categories.list(query.active_only).await?;
    debug!("Returning {} categories", categories.len());
    Ok(Json(ApiResponse::ok(categories)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 409, description = "Name already used, ignoring case", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CategoryDto>>)> {
    let category = state.ledger.categories.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(category, "category created")),
    ))
}

/// Get a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryDto),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ApiResponse<CategoryDto>>> {
    let category = state.ledger.categories.get(id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// Rename a category or change its status
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Name already used, ignoring case", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<Json<ApiResponse<CategoryDto>>> {
    let category = state.ledger.categories.update(id, request).await?;
    Ok(Json(ApiResponse::with_message(category, "category updated")))
}

/// Flip a category between active and inactive
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Status toggled", body = CategoryDto),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn toggle_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ApiResponse<CategoryDto>>> {
    let category = state.ledger.categories.toggle_status(id).await?;
    Ok(Json(ApiResponse::with_message(category, "category status updated")))
}
