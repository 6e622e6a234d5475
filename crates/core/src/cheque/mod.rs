//! Cheque registry.
//!
//! Cheques move `pending → deposited → passed | returned`. Clearing credits
//! the deposit account; a return reverses whatever the cheque posted and,
//! for a bounced cheque, puts the amount back on the customer's account.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::ChequeError;
pub use service::ChequeService;
pub use types::{ChequeAction, ChequeState, ChequeStatus, NewCheque, ReturnCause, SettlementEffect};
