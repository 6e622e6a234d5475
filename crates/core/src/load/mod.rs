//! Load sheet aggregation.
//!
//! # Modules
//!
//! - `types` - Load sheet domain types
//! - `error` - Load-specific error types
//! - `service` - Batch validation, numbering and closing

pub mod error;
pub mod service;
pub mod types;

pub use error::LoadError;
pub use service::LoadService;
pub use types::{LoadPlan, LoadState, LoadTransition, NewLoad};
