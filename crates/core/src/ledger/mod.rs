//! Double-entry ledger model.
//!
//! This module implements the core ledger types:
//! - Transaction headers and their splits
//! - Document detail rows and applied credits
//! - The balance invariant and normal-side sign rule
//! - Error types for ledger operations

pub mod balance;
pub mod document;
pub mod error;
pub mod split;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{NormalSide, RunningBalance};
pub use document::{AppliedCredit, DocumentLine, DocumentRecord, LineDraft, available_credit};
pub use error::{ErrorKind, FieldError, LedgerError};
pub use split::{Split, SplitCandidate};
pub use transaction::{Transaction, TransactionHeader, totals};
pub use types::{
    DocumentType, EntryType, RecordStatus, RowFilter, TransactionStatus, TransactionTotals,
};
pub use validation::{candidate_totals, validate_candidates, validate_splits};
