//! Stock ledger.
//!
//! Good and damaged quantities per (location, product). Every change is
//! attributed to a [`MovementKind`] and recorded as a [`StockMovement`].

mod error;
mod purchase;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::StockError;
pub use purchase::{PurchaseLineInput, PurchaseStatus, purchase_total};
pub use service::StockService;
pub use types::{
    AdjustmentLine, DamageLine, MovementKind, StockKey, StockMovement, StockPlan, StockPosition,
    TransferLine,
};
