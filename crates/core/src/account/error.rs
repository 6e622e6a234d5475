//! Account error types.

use haulbook_shared::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// Source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountId),

    /// The debit would overdraw an account that does not allow it.
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The account.
        account_id: AccountId,
        /// Its balance.
        balance: Decimal,
        /// Amount that was to be debited.
        requested: Decimal,
    },

    /// Account not found.
    #[error("Account {0} not found")]
    NotFound(AccountId),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AccountError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SameAccount(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::InsufficientFunds { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
