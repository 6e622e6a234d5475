//! Cheque error types.

use haulbook_shared::types::ChequeId;
use thiserror::Error;

use crate::account::AccountError;
use crate::cheque::types::ChequeStatus;

/// Errors that can occur during cheque operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChequeError {
    /// Attempted an invalid status transition.
    #[error("Cheque {cheque_id}: invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The cheque.
        cheque_id: ChequeId,
        /// Current status.
        from: ChequeStatus,
        /// Attempted status.
        to: ChequeStatus,
    },

    /// Cheque not found.
    #[error("Cheque {0} not found")]
    NotFound(ChequeId),

    /// The cheque number is already registered for the payment.
    #[error("Cheque '{0}' is already registered for this payment")]
    Duplicate(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Posting to the deposit account failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ChequeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Duplicate(_) => 409,
            Self::Account(inner) => inner.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Account(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_shared::types::AccountId;

    #[test]
    fn test_invalid_transition_error() {
        let err = ChequeError::InvalidTransition {
            cheque_id: ChequeId::new(),
            from: ChequeStatus::Passed,
            to: ChequeStatus::Returned,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("passed"));
    }

    #[test]
    fn test_account_errors_pass_through() {
        let err = ChequeError::from(AccountError::NotFound(AccountId::new()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
