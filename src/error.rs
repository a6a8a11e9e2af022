use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ledger::LedgerError;
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error returned by every JSON handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] LedgerError);

impl ApiError {
    pub fn unauthorized() -> Self {
        Self(LedgerError::Unauthorized("authentication required".to_string()))
    }

    pub fn forbidden() -> Self {
        Self(LedgerError::Forbidden(
            "you do not have permission to access this resource".to_string(),
        ))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerError::Forbidden(_) | LedgerError::Locked(_) => StatusCode::FORBIDDEN,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Database(_) | LedgerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            LedgerError::Validation(_) => "validation_error",
            LedgerError::Unauthorized(_) => "unauthorized",
            LedgerError::Forbidden(_) => "forbidden",
            LedgerError::Locked(_) => "budget_locked",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Database(_) | LedgerError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.0.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
