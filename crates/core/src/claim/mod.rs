//! Free-issue claim conversion.
//!
//! Free quantities given away on order lines are claimed back from the
//! supplier as a zero-cost purchase that restocks the warehouse.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::ClaimError;
pub use service::ClaimService;
pub use types::{ClaimConversion, ClaimItem, ClaimStatus};
