//! Ledger error types for validation, reference, invariant, conflict and
//! storage failures.
//!
//! Every variant belongs to exactly one [`ErrorKind`], which is what callers
//! branch on; the variant itself names the offending field or record.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use propledger_shared::AppError;
use propledger_shared::types::{
    AccountId, AccountTypeId, AppliedCreditId, DocumentId, ItemId, TransactionId,
};

use super::types::DocumentType;

/// Coarse error classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// A referenced id does not resolve.
    ReferenceNotFound,
    /// Compiled postings break the ledger invariants.
    InvariantViolation,
    /// Duplicate natural key or exhausted availability.
    Conflict,
    /// The store failed; nothing was written.
    Storage,
}

/// One invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path, e.g. `items[2].rate`.
    pub field: String,
    /// Human readable reason.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins field errors for display.
fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// One or more request fields are invalid.
    #[error("Invalid input: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// A split touches an AR/AP account without a counterpart party.
    #[error("Account {account_id} is AR/AP and requires a customer or vendor")]
    MissingParty {
        /// The AR/AP account.
        account_id: AccountId,
    },

    /// An edit tried to change the document type.
    #[error("Document {document_id} is a {expected}, not a {actual}")]
    DocumentTypeMismatch {
        /// The stored document.
        document_id: DocumentId,
        /// The stored type.
        expected: DocumentType,
        /// The type in the request.
        actual: DocumentType,
    },

    /// Report date range is inverted.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: chrono::NaiveDate,
        /// End date.
        end: chrono::NaiveDate,
    },

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account type not found.
    #[error("Account type not found: {0}")]
    AccountTypeNotFound(AccountTypeId),

    /// Item not found.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Applied credit not found.
    #[error("Applied credit not found: {0}")]
    AppliedCreditNotFound(AppliedCreditId),

    // ========== Invariant Errors ==========
    /// Transaction must have at least 2 splits.
    #[error("Transaction must have at least 2 splits, got {count}")]
    InsufficientSplits {
        /// Number of splits compiled.
        count: usize,
    },

    /// Transaction is not balanced (debits != credits).
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedTransaction {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A split amount is zero or negative, or both/neither side is set.
    #[error("Invalid split on account {account_id}: {reason}")]
    InvalidSplit {
        /// The split's account.
        account_id: AccountId,
        /// What is wrong with it.
        reason: String,
    },

    /// Rounding drift exceeded the configured ceiling.
    #[error("Rounding drift {drift} exceeds the allowed {limit}")]
    RoundingDriftExceeded {
        /// Signed debit minus credit before correction.
        drift: Decimal,
        /// Configured ceiling.
        limit: Decimal,
    },

    // ========== Conflict Errors ==========
    /// Document number already used in this building.
    #[error("{document_type} number '{number}' already exists")]
    DuplicateNumber {
        /// Type of the clashing document.
        document_type: DocumentType,
        /// The duplicated number.
        number: String,
    },

    /// Credit memo does not have enough unapplied balance.
    #[error("Credit memo {credit_memo_id} has {available} available, {requested} requested")]
    InsufficientCredit {
        /// The credit memo.
        credit_memo_id: DocumentId,
        /// Remaining unapplied amount.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// The document is voided and cannot change.
    #[error("Document {0} is voided")]
    DocumentVoided(DocumentId),

    // ========== Storage Errors ==========
    /// The ledger store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Returns the error class.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::MissingParty { .. }
            | Self::DocumentTypeMismatch { .. }
            | Self::InvalidDateRange { .. } => ErrorKind::Validation,

            Self::AccountNotFound(_)
            | Self::AccountTypeNotFound(_)
            | Self::ItemNotFound(_)
            | Self::DocumentNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::AppliedCreditNotFound(_) => ErrorKind::ReferenceNotFound,

            Self::InsufficientSplits { .. }
            | Self::UnbalancedTransaction { .. }
            | Self::InvalidSplit { .. }
            | Self::RoundingDriftExceeded { .. } => ErrorKind::InvariantViolation,

            Self::DuplicateNumber { .. }
            | Self::InsufficientCredit { .. }
            | Self::DocumentVoided(_) => ErrorKind::Conflict,

            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MissingParty { .. } => "MISSING_PARTY",
            Self::DocumentTypeMismatch { .. } => "DOCUMENT_TYPE_MISMATCH",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountTypeNotFound(_) => "ACCOUNT_TYPE_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::AppliedCreditNotFound(_) => "APPLIED_CREDIT_NOT_FOUND",
            Self::InsufficientSplits { .. } => "INSUFFICIENT_SPLITS",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::InvalidSplit { .. } => "INVALID_SPLIT",
            Self::RoundingDriftExceeded { .. } => "ROUNDING_DRIFT_EXCEEDED",
            Self::DuplicateNumber { .. } => "DUPLICATE_NUMBER",
            Self::InsufficientCredit { .. } => "INSUFFICIENT_CREDIT",
            Self::DocumentVoided(_) => "DOCUMENT_VOIDED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::ReferenceNotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InvariantViolation => 422,
            ErrorKind::Storage => 500,
        }
    }

    /// Returns the offending input fields, if the error names any.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldError> {
        match self {
            Self::Validation(errors) => errors.clone(),
            Self::MissingParty { account_id } => vec![FieldError::new(
                "party_id",
                format!("required for AR/AP account {account_id}"),
            )],
            Self::InsufficientCredit { .. } => {
                vec![FieldError::new("amount", "exceeds available credit")]
            }
            Self::DuplicateNumber { .. } => vec![FieldError::new("number", "already exists")],
            _ => Vec::new(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::ReferenceNotFound => Self::NotFound(message),
            ErrorKind::InvariantViolation => Self::Invariant(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Storage => Self::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LedgerError::invalid("number", "required"), ErrorKind::Validation, 400)]
    #[case(LedgerError::MissingParty { account_id: AccountId::new() }, ErrorKind::Validation, 400)]
    #[case(LedgerError::AccountNotFound(AccountId::new()), ErrorKind::ReferenceNotFound, 404)]
    #[case(LedgerError::ItemNotFound(ItemId::new()), ErrorKind::ReferenceNotFound, 404)]
    #[case(
        LedgerError::UnbalancedTransaction { debit: dec!(1), credit: dec!(2) },
        ErrorKind::InvariantViolation,
        422
    )]
    #[case(LedgerError::InsufficientSplits { count: 1 }, ErrorKind::InvariantViolation, 422)]
    #[case(
        LedgerError::DuplicateNumber { document_type: DocumentType::Invoice, number: "1".into() },
        ErrorKind::Conflict,
        409
    )]
    #[case(
        LedgerError::InsufficientCredit {
            credit_memo_id: DocumentId::new(),
            available: dec!(0),
            requested: dec!(1),
        },
        ErrorKind::Conflict,
        409
    )]
    #[case(LedgerError::Storage("boom".into()), ErrorKind::Storage, 500)]
    fn test_error_kinds(#[case] err: LedgerError, #[case] kind: ErrorKind, #[case] status: u16) {
        assert_eq!(err.kind(), kind);
        assert_eq!(err.http_status_code(), status);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedTransaction {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Transaction is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::Validation(vec![
            FieldError::new("number", "is required"),
            FieldError::new("items", "must not be empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid input: number: is required; items: must not be empty"
        );

        let err = LedgerError::DuplicateNumber {
            document_type: DocumentType::Invoice,
            number: "INV-1".into(),
        };
        assert_eq!(err.to_string(), "invoice number 'INV-1' already exists");
    }

    #[test]
    fn test_fields_name_the_offender() {
        let err = LedgerError::invalid("items[1].rate", "not a number");
        assert_eq!(err.fields()[0].field, "items[1].rate");

        let err = LedgerError::MissingParty {
            account_id: AccountId::new(),
        };
        assert_eq!(err.fields()[0].field, "party_id");
        assert!(LedgerError::Storage("x".into()).fields().is_empty());
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::DocumentNotFound(DocumentId::new()).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = LedgerError::InsufficientSplits { count: 0 }.into();
        assert_eq!(app.error_code(), "INVARIANT_VIOLATION");
    }
}
