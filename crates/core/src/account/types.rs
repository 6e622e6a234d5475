//! Account domain types.

use haulbook_shared::types::{AccountId, ChequeId, TransferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Physical cash held by the business.
    CashOnHand,
    /// Bank savings account.
    Savings,
    /// Bank current account.
    Current,
}

impl AccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnHand => "cash_on_hand",
            Self::Savings => "savings",
            Self::Current => "current",
        }
    }

    /// Parses a type, accepting any casing and "cash on hand" style spellings.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "cashonhand" | "cash" => Some(Self::CashOnHand),
            "savings" | "saving" => Some(Self::Savings),
            "current" => Some(Self::Current),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The balance-relevant state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    /// Account identifier.
    pub id: AccountId,
    /// Current balance.
    pub balance: Decimal,
    /// Whether the balance may go below zero.
    pub allow_overdraft: bool,
}

/// Cause of a ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Opening balance.
    Opening,
    /// Cash paid in.
    Deposit,
    /// Cash taken out.
    Withdrawal,
    /// Credit side of a transfer.
    TransferIn,
    /// Debit side of a transfer.
    TransferOut,
    /// A cleared cheque.
    ChequeClear,
    /// Reversal of a cheque's earlier effect.
    ChequeReversal,
}

impl EntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::ChequeClear => "cheque_clear",
            Self::ChequeReversal => "cheque_reversal",
        }
    }

    /// Parses a kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "opening" => Some(Self::Opening),
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "transfer_in" => Some(Self::TransferIn),
            "transfer_out" => Some(Self::TransferOut),
            "cheque_clear" => Some(Self::ChequeClear),
            "cheque_reversal" => Some(Self::ChequeReversal),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One balance change of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPosting {
    /// Account changed.
    pub account_id: AccountId,
    /// Cause.
    pub kind: EntryKind,
    /// Signed amount: positive credits, negative debits.
    pub amount: Decimal,
    /// Balance after the posting.
    pub balance_after: Decimal,
    /// Transfer this posting is one side of.
    pub transfer_id: Option<TransferId>,
    /// Cheque this posting settles.
    pub cheque_id: Option<ChequeId>,
}

/// Both sides of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Shared transfer identifier.
    pub transfer_id: TransferId,
    /// Posting on the source account.
    pub debit: LedgerPosting,
    /// Posting on the destination account.
    pub credit: LedgerPosting,
}
