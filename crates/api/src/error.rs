//! HTTP error responses.
//!
//! Every domain error carries its own status and code; this module renders
//! them as `{ "error": code, "message": text }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use haulbook_core::account::AccountError;
use haulbook_core::cheque::ChequeError;
use haulbook_core::claim::ClaimError;
use haulbook_core::load::LoadError;
use haulbook_core::order::OrderError;
use haulbook_core::reconciliation::ReconciliationError;
use haulbook_core::stock::StockError;
use haulbook_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A 400 validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }

    /// The HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "request failed");
            return (
                self.status,
                Json(json!({
                    "error": self.code,
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }

        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message
            })),
        )
            .into_response()
    }
}

macro_rules! domain_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(e: $error) -> Self {
                    Self::from_parts(e.status_code(), e.error_code(), e.to_string())
                }
            }
        )+
    };
}

domain_error!(
    OrderError,
    LoadError,
    ReconciliationError,
    ChequeError,
    AccountError,
    StockError,
    ClaimError,
);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        AppError::Database(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_shared::types::{AccountId, LoadId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_domain_errors_keep_status_and_code() {
        let err = ApiError::from(AccountError::InsufficientFunds {
            account_id: AccountId::new(),
            balance: dec!(10),
            requested: dec!(20),
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");

        let err = ApiError::from(ReconciliationError::LoadClosed(LoadId::new()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::validation("lines: must not be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err = ApiError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
