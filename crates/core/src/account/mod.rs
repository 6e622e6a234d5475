//! Account ledger.
//!
//! Bank and cash accounts with a signed balance. Every balance change is
//! paired with a [`LedgerPosting`], so the postings of an account always sum
//! to its balance.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::AccountError;
pub use service::AccountService;
pub use types::{AccountState, AccountType, EntryKind, LedgerPosting, TransferPlan};
