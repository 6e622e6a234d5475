//! Order error types.

use haulbook_shared::types::{LoadId, OrderId};
use thiserror::Error;

use crate::order::types::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Attempted an invalid status transition.
    #[error("Order {order_id}: invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The order.
        order_id: OrderId,
        /// The current status.
        from: OrderStatus,
        /// The attempted target status.
        to: OrderStatus,
    },

    /// The order is already attached to an open load.
    #[error("Order {order_id} is already on open load {load_id}")]
    AlreadyLoaded {
        /// The order.
        order_id: OrderId,
        /// The open load holding it.
        load_id: LoadId,
    },

    /// Order not found.
    #[error("Order {0} not found")]
    NotFound(OrderId),

    /// An order with the same business number already exists.
    #[error("Order number '{0}' already exists")]
    Duplicate(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl OrderError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::AlreadyLoaded { .. } | Self::Duplicate(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AlreadyLoaded { .. } => "ALREADY_LOADED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = OrderError::InvalidTransition {
            order_id: OrderId::new(),
            from: OrderStatus::Pending,
            to: OrderStatus::Loading,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("pending"));
        assert!(err.to_string().contains("loading"));
    }

    #[test]
    fn test_already_loaded_error() {
        let err = OrderError::AlreadyLoaded {
            order_id: OrderId::new(),
            load_id: LoadId::new(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ALREADY_LOADED");
    }

    #[test]
    fn test_not_found_error() {
        let err = OrderError::NotFound(OrderId::new());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
