//! Order lifecycle management.
//!
//! # Modules
//!
//! - `types` - Order domain types (OrderStatus, PaymentStatus, OrderSnapshot)
//! - `error` - Order-specific error types
//! - `amounts` - Append-only amount ledger and order totals
//! - `service` - State transition logic

pub mod amounts;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use amounts::{AmountChange, AmountChangeKind, dispatched_amount, order_total};
pub use error::OrderError;
pub use service::OrderService;
pub use types::{
    LoadAssignment, OrderLineInput, OrderSnapshot, OrderStatus, OrderTransition, PaymentStatus,
};
