//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Each mutating call loads the rows it needs under lock, lets the matching
//! core service decide, and persists the outcome in one transaction.

pub mod account;
pub mod cheque;
pub mod claim;
pub mod history;
pub mod load;
pub mod order;
pub mod reconciliation;
pub mod stock;

pub use account::{AccountRepository, OpenAccountInput, TransferInput, TransferResult};
pub use cheque::ChequeRepository;
pub use claim::{ClaimRepository, ConvertClaimsInput};
pub use history::HistoryRepository;
pub use load::{LoadDetail, LoadEntry, LoadRepository};
pub use order::{OrderDetail, OrderRepository, PlaceOrderInput};
pub use reconciliation::{OrderResult, ReconciliationReport, ReconciliationRepository};
pub use stock::{PurchaseDetail, ReceivePurchaseInput, StockRepository};
