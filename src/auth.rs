//! Session cookies and the access-control middleware.
//!
//! API paths (`/api/...`) answer failed checks with JSON 401/403 errors.
//! Page paths redirect: to the login page with a `return_to` parameter when
//! there is no session, to the dashboard with an error flag when the role is
//! insufficient.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use common::{Role, UserDto};
use ledger::Actor;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

pub const SESSION_COOKIE: &str = "session_token";

/// The user behind the current request, placed into the request extensions
/// by the access-control middleware.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserDto);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Reads the session token from the `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    authorize(&state, request, next, |_| true).await
}

pub async fn require_management(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    authorize(&state, request, next, Role::can_manage).await
}

pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    authorize(&state, request, next, Role::is_admin).await
}

async fn authorize(
    state: &AppState,
    mut request: Request,
    next: Next,
    allowed: fn(&Role) -> bool,
) -> Response {
    let api = is_api_path(request.uri());

    let user = match session_token(request.headers()) {
        Some(token) => match state.ledger.auth.authenticate(&token).await {
            Ok(user) => user,
            Err(e) => return ApiError::from(e).into_response(),
        },
        None => None,
    };

    let Some(user) = user else {
        debug!(path = %request.uri().path(), "Request without a valid session");
        return if api {
            ApiError::unauthorized().into_response()
        } else {
            login_redirect(request.uri()).into_response()
        };
    };

    if !allowed(&user.role) {
        warn!(
            user = user.id,
            role = %user.role,
            path = %request.uri().path(),
            "Role not allowed"
        );
        return if api {
            ApiError::forbidden().into_response()
        } else {
            Redirect::to("/?error=forbidden").into_response()
        };
    }

    request.extensions_mut().insert(AuthUser(user));
    next.run(request).await
}

fn is_api_path(uri: &Uri) -> bool {
    uri.path() == "/api" || uri.path().starts_with("/api/")
}

fn login_redirect(uri: &Uri) -> Redirect {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::to(&format!("/login?return_to={}", urlencoding::encode(target)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_or_empty_session_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_login_redirect_keeps_return_path() {
        let uri: Uri = "/budgets?year=2026".parse().unwrap();
        let response = login_redirect(&uri).into_response();
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/login?return_to=%2Fbudgets%3Fyear%3D2026");
    }

    #[test]
    fn test_api_path_detection() {
        assert!(is_api_path(&"/api/expenses".parse().unwrap()));
        assert!(!is_api_path(&"/expenses".parse().unwrap()));
        assert!(!is_api_path(&"/apiary".parse().unwrap()));
    }
}
