use thiserror::Error;

/// Error types for the ledger module
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The request is malformed or breaks a business rule
    #[error("{0}")]
    Validation(String),

    /// No session, an unknown session, or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// The actor's role does not allow the operation
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule would be broken
    #[error("{0}")]
    Conflict(String),

    /// Spending for the category has been switched off for the year
    #[error("{0}")]
    Locked(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Runtime error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: &str, id: i32) -> Self {
        Self::NotFound(format!("{} with id {} not found", what, id))
    }
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
