use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Json},
};
use common::{LoginRequest, SetPasswordRequest, UserDto};
use tracing::{debug, instrument};

use crate::auth::{expired_session_cookie, session_cookie, session_token};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::schemas::{ApiResponse, AppState};

/// Log in with email and password
///
/// Sets the `session_token` cookie and also returns the token in the body.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials or inactive account", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.ledger.auth.login(request).await?;
    let cookie = session_cookie(&response.token);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::with_message(response, "login successful")),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.ledger.auth.logout(&token).await;
        debug!("Session closed");
    }
    (
        AppendHeaders([(header::SET_COOKIE, expired_session_cookie())]),
        Json(ApiResponse::with_message((), "logged out")),
    )
}

/// Choose a password using the token from the invitation mail
#[utoipa::path(
    post,
    path = "/api/set-password",
    tag = "auth",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password set, account active", body = UserDto),
        (status = 400, description = "Invalid or expired token, or empty password", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn set_password(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.ledger.auth.set_password(request).await?;
    Ok(Json(ApiResponse::with_message(
        user,
        "password set, you can now log in",
    )))
}
