//! Core business logic for Haulbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Services receive the current state of the entities involved and return
//! either a typed error or a plan of every mutation to persist.
//!
//! # Modules
//!
//! - `order` - Order status state machine and amount ledger
//! - `load` - Load sheet aggregation
//! - `reconciliation` - Post-delivery reconciliation of a load
//! - `cheque` - Cheque lifecycle and its settlement effects
//! - `account` - Account balances and postings
//! - `stock` - Stock positions and movements
//! - `claim` - Free-issue claim conversion
//! - `history` - Transition history records

pub mod account;
pub mod cheque;
pub mod claim;
pub mod history;
pub mod load;
pub mod order;
pub mod reconciliation;
pub mod stock;
