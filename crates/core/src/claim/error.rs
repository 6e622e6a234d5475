//! Claim error types.

use haulbook_shared::types::OrderLineId;
use thiserror::Error;

use crate::stock::StockError;

/// Errors that can occur while converting claims.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// Malformed selection.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A selected line does not exist.
    #[error("Order line {0} not found")]
    NotFound(OrderLineId),

    /// A selected line was already converted.
    #[error("Order line {0} is already claimed")]
    AlreadyClaimed(OrderLineId),

    /// Posting the restock failed.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ClaimError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::AlreadyClaimed(_) => 409,
            Self::Stock(inner) => inner.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyClaimed(_) => "ALREADY_CLAIMED",
            Self::Stock(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_claimed_error() {
        let err = ClaimError::AlreadyClaimed(OrderLineId::new());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ALREADY_CLAIMED");
    }
}
