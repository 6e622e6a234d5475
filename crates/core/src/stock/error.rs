//! Stock error types.

use haulbook_shared::types::{LocationId, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during stock operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    /// A line asks for more good stock than the location holds.
    #[error(
        "Insufficient stock of product {product_id} at location {location_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Location.
        location_id: LocationId,
        /// Product.
        product_id: ProductId,
        /// Good quantity on hand.
        available: Decimal,
        /// Total quantity requested.
        requested: Decimal,
    },

    /// The purchase number is already used.
    #[error("Purchase number '{0}' already exists")]
    Duplicate(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StockError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientStock { .. } => 422,
            Self::Duplicate(_) => 409,
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
