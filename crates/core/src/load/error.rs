//! Load error types.

use haulbook_shared::types::{LoadId, OrderId};
use thiserror::Error;

use crate::order::OrderError;

/// Errors that can occur while building or closing a load sheet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// No orders were selected.
    #[error("A load needs at least one order")]
    EmptySelection,

    /// The same order was selected twice.
    #[error("Order {0} is selected more than once")]
    DuplicateOrder(OrderId),

    /// Selected orders belong to different business units.
    #[error("Order {0} belongs to a different business unit than the rest of the load")]
    MixedBusinessUnits(OrderId),

    /// A selected order could not be loaded.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Load not found.
    #[error("Load {0} not found")]
    NotFound(LoadId),

    /// The load is closed and immutable.
    #[error("Load {0} is closed")]
    LoadClosed(LoadId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LoadError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptySelection | Self::DuplicateOrder(_) | Self::MixedBusinessUnits(_) => 400,
            Self::Order(inner) => inner.status_code(),
            Self::NotFound(_) => 404,
            Self::LoadClosed(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySelection | Self::DuplicateOrder(_) | Self::MixedBusinessUnits(_) => {
                "VALIDATION_ERROR"
            }
            Self::Order(inner) => inner.error_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::LoadClosed(_) => "LOAD_CLOSED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;

    #[test]
    fn test_validation_errors() {
        assert_eq!(LoadError::EmptySelection.status_code(), 400);
        assert_eq!(
            LoadError::DuplicateOrder(OrderId::new()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_order_errors_keep_their_code() {
        let order_id = OrderId::new();
        let err = LoadError::from(OrderError::InvalidTransition {
            order_id,
            from: OrderStatus::Pending,
            to: OrderStatus::InTransit,
        });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains(&order_id.to_string()));
    }

    #[test]
    fn test_load_closed_error() {
        let err = LoadError::LoadClosed(LoadId::new());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "LOAD_CLOSED");
    }
}
