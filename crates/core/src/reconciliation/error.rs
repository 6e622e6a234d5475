//! Reconciliation error types.

use haulbook_shared::types::{LoadId, OrderId};
use thiserror::Error;

use crate::account::AccountError;
use crate::cheque::ChequeError;

/// Errors that reject a whole reconciliation batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconciliationError {
    /// Load not found.
    #[error("Load {0} not found")]
    NotFound(LoadId),

    /// The load is closed and the batch would change it.
    #[error("Load {0} is closed")]
    LoadClosed(LoadId),

    /// An update is malformed.
    #[error("Order {order_id}: {message}")]
    Validation {
        /// The offending update's order.
        order_id: OrderId,
        /// What is wrong with it.
        message: String,
    },

    /// Settling a returned order's cheques failed.
    #[error(transparent)]
    Cheque(#[from] ChequeError),

    /// Reversing a cheque's ledger effect failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReconciliationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::LoadClosed(_) => 409,
            Self::Validation { .. } => 400,
            Self::Cheque(inner) => inner.status_code(),
            Self::Account(inner) => inner.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::LoadClosed(_) => "LOAD_CLOSED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Cheque(inner) => inner.error_code(),
            Self::Account(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let closed = ReconciliationError::LoadClosed(LoadId::new());
        assert_eq!(closed.status_code(), 409);
        assert_eq!(closed.error_code(), "LOAD_CLOSED");

        let invalid = ReconciliationError::Validation {
            order_id: OrderId::new(),
            message: "final amount must not be negative".into(),
        };
        assert_eq!(invalid.status_code(), 400);
        assert!(invalid.to_string().contains("negative"));
    }
}
