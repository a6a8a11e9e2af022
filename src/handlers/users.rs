use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use common::{CreateUserRequest, UpdateRoleRequest, UserDto};
use tracing::{info, instrument};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::schemas::{ApiResponse, AppState};

/// List all users, newest first
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Users", body = Vec<UserDto>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<UserDto>>>> {
    let users = state.ledger.users.list().await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// Invite a user
///
/// The account stays inactive until the mailed password link is used.
/// Also served at `/api/users/create`.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Missing field or unknown role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    let user = state.ledger.users.create(request).await?;
    info!("Invited user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            user,
            "user created, a password link has been sent",
        )),
    ))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.ledger.users.get(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Change the role of a user
#[utoipa::path(
    patch,
    path = "/api/users/update-role",
    tag = "users",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserDto),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_role(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.ledger.users.update_role(request).await?;
    Ok(Json(ApiResponse::with_message(user, "role updated")))
}
