//! Ledger domain types shared by documents, postings, and reports.
//!
//! This module defines the closed enums that tag transactions and ledger
//! rows, plus the debit/credit totals used for balance checks.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::round_cents;

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/income accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/income accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryType {
    /// Returns the other side of the ledger.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Business document that produced a ledger transaction.
///
/// Applied credits are absent on purpose: they never post to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// Sales invoice posted against accounts receivable.
    Invoice,
    /// Check paying one or more expenses.
    Check,
    /// Credit memo issued to a customer.
    CreditMemo,
    /// General journal entry.
    Journal,
    /// Sales receipt deposited straight to a cash/bank account.
    SalesReceipt,
    /// Customer payment against an invoice.
    InvoicePayment,
    /// Discount applied to an invoice after issue.
    #[serde(rename = "payment-applied-discount")]
    AppliedDiscount,
}

impl DocumentType {
    /// All document types, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Invoice,
        Self::Check,
        Self::CreditMemo,
        Self::Journal,
        Self::SalesReceipt,
        Self::InvoicePayment,
        Self::AppliedDiscount,
    ];

    /// Returns the stable tag stored on transaction headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Check => "check",
            Self::CreditMemo => "credit-memo",
            Self::Journal => "journal",
            Self::SalesReceipt => "sales-receipt",
            Self::InvoicePayment => "invoice-payment",
            Self::AppliedDiscount => "payment-applied-discount",
        }
    }

    /// Returns true if documents of this type carry a number that must be
    /// unique per building.
    #[must_use]
    pub const fn is_numbered(self) -> bool {
        matches!(
            self,
            Self::Invoice | Self::Check | Self::CreditMemo | Self::Journal | Self::SalesReceipt
        )
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown document type: {s}"))
    }
}

/// Status of a transaction header or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Counted by every report.
    Active,
    /// Ignored by reports; kept for audit.
    Voided,
}

impl TransactionStatus {
    /// Returns true if the record can still be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Status of a split, document line, or applied credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Current row.
    Active,
    /// Replaced by a later edit; never deleted.
    Superseded,
}

/// Which rows a read should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowFilter {
    /// Only `active` rows.
    #[default]
    ActiveOnly,
    /// Active and superseded rows (audit view).
    All,
}

impl RowFilter {
    /// Returns true if a row with this status passes the filter.
    #[must_use]
    pub fn admits(self, status: RecordStatus) -> bool {
        match self {
            Self::ActiveOnly => status == RecordStatus::Active,
            Self::All => true,
        }
    }
}

/// Transaction totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the transaction is balanced to the cent.
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates new transaction totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: round_cents(debit) == round_cents(credit),
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
