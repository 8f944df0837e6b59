//! Ledger error taxonomy
//!
//! Every guarded operation fails with one of these. The API layer maps each
//! variant to an HTTP status through [`LedgerError::code`].

/// Error types for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No identity on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Identity present but not allowed to touch the resource
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Identifier or slug does not resolve to a row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Submitted data is unusable
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store or other internal failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Unauthenticated => "UNAUTHORIZED",
            LedgerError::Forbidden(_) => "FORBIDDEN",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn not_found(what: impl std::fmt::Display, id: impl std::fmt::Display) -> Self {
        LedgerError::NotFound(format!("{} {} not found", what, id))
    }
}
