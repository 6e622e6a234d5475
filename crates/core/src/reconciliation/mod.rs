//! Load reconciliation.
//!
//! Records the delivery outcome of every order on a returned load, compares
//! the final invoice amount to the dispatched snapshot, and closes the load.

mod error;
mod service;
mod types;

pub use error::ReconciliationError;
pub use service::ReconciliationService;
pub use types::{
    LoadedOrder, OrderOutcome, OrderUpdate, OutcomeKind, ReconciledOrder, ReconciliationPlan,
    SkipReason,
};
