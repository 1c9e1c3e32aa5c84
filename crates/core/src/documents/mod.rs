//! Business documents and the compilers that turn them into splits.
//!
//! Every posting document is a variant of [`Document`]; dispatch is an
//! exhaustive match, so adding a document type without a compiler does not
//! build. Applied credits are deliberately not a `Document`: they never
//! post to the ledger.

pub mod applied_credit;
pub mod balancing;
pub mod check;
pub mod common;
pub mod credit_memo;
pub mod invoice;
mod items;
pub mod journal;
pub mod payment;
pub mod request;
pub mod sales_receipt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{AccountId, DocumentId, ItemId, PartyId};

use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, LedgerError, TransactionHeader};

pub use applied_credit::{check_availability, check_resize};
pub use balancing::BalancingPolicy;
pub use check::compile_check;
pub use common::CompiledDocument;
pub use credit_memo::compile_credit_memo;
pub use invoice::compile_invoice;
pub use journal::compile_journal;
pub use payment::{compile_applied_discount, compile_invoice_payment};
pub use request::{
    AppliedCreditRequest, AppliedDiscountRequest, CheckRequest, CreditMemoRequest, ExpenseLine,
    InvoicePaymentRequest, InvoiceRequest, ItemLine, JournalLine, JournalRequest,
    SalesReceiptRequest,
};
pub use sales_receipt::compile_sales_receipt;

/// A document that posts to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Document {
    /// Sales invoice.
    Invoice(InvoiceRequest),
    /// Check.
    Check(CheckRequest),
    /// Credit memo.
    CreditMemo(CreditMemoRequest),
    /// General journal.
    Journal(JournalRequest),
    /// Sales receipt.
    SalesReceipt(SalesReceiptRequest),
    /// Invoice payment.
    InvoicePayment(InvoicePaymentRequest),
    /// Discount applied to an invoice.
    #[serde(rename = "payment-applied-discount")]
    AppliedDiscount(AppliedDiscountRequest),
}

impl Document {
    /// The tag stored on the transaction header.
    #[must_use]
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Invoice(_) => DocumentType::Invoice,
            Self::Check(_) => DocumentType::Check,
            Self::CreditMemo(_) => DocumentType::CreditMemo,
            Self::Journal(_) => DocumentType::Journal,
            Self::SalesReceipt(_) => DocumentType::SalesReceipt,
            Self::InvoicePayment(_) => DocumentType::InvoicePayment,
            Self::AppliedDiscount(_) => DocumentType::AppliedDiscount,
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        match self {
            Self::Invoice(r) => r.validate(),
            Self::Check(r) => r.validate(),
            Self::CreditMemo(r) => r.validate(),
            Self::Journal(r) => r.validate(),
            Self::SalesReceipt(r) => r.validate(),
            Self::InvoicePayment(r) => r.validate(),
            Self::AppliedDiscount(r) => r.validate(),
        }
    }

    /// Document number, for numbered documents.
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        let number = match self {
            Self::Invoice(r) => &r.number,
            Self::Check(r) => &r.number,
            Self::CreditMemo(r) => &r.number,
            Self::Journal(r) => &r.number,
            Self::SalesReceipt(r) => &r.number,
            Self::InvoicePayment(_) | Self::AppliedDiscount(_) => return None,
        };
        Some(number.trim())
    }

    /// Document date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Invoice(r) => r.invoice_date,
            Self::Check(r) => r.check_date,
            Self::CreditMemo(r) => r.memo_date,
            Self::Journal(r) => r.journal_date,
            Self::SalesReceipt(r) => r.receipt_date,
            Self::InvoicePayment(r) => r.payment_date,
            Self::AppliedDiscount(r) => r.discount_date,
        }
    }

    /// Customer or vendor on the document header.
    #[must_use]
    pub fn party_id(&self) -> Option<PartyId> {
        match self {
            Self::Invoice(r) => r.customer_id,
            Self::Check(r) => r.vendor_id,
            Self::CreditMemo(r) => r.customer_id,
            Self::Journal(_) => None,
            Self::SalesReceipt(r) => r.customer_id,
            Self::InvoicePayment(r) => r.customer_id,
            Self::AppliedDiscount(r) => r.customer_id,
        }
    }

    /// Invoice a payment or discount is applied to.
    #[must_use]
    pub fn invoice_id(&self) -> Option<DocumentId> {
        match self {
            Self::InvoicePayment(r) => Some(r.invoice_id),
            Self::AppliedDiscount(r) => Some(r.invoice_id),
            _ => None,
        }
    }

    /// Header fields for the transaction.
    #[must_use]
    pub fn header(&self) -> TransactionHeader {
        let (memo, reference, unit_id) = match self {
            Self::Invoice(r) => (&r.memo, &r.reference, r.unit_id),
            Self::Check(r) => (&r.memo, &r.reference, r.unit_id),
            Self::CreditMemo(r) => (&r.memo, &r.reference, r.unit_id),
            Self::Journal(r) => (&r.memo, &r.reference, r.unit_id),
            Self::SalesReceipt(r) => (&r.memo, &r.reference, r.unit_id),
            Self::InvoicePayment(r) => (&r.memo, &r.reference, r.unit_id),
            Self::AppliedDiscount(r) => (&r.memo, &r.reference, r.unit_id),
        };
        TransactionHeader {
            transaction_date: self.date(),
            memo: memo.clone(),
            reference: reference.clone(),
            unit_id,
        }
    }

    /// Accounts the document names directly.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        match self {
            Self::Invoice(r) => vec![r.ar_account_id],
            Self::Check(r) => std::iter::once(r.payment_account_id)
                .chain(r.expenses.iter().map(|l| l.account_id))
                .collect(),
            Self::CreditMemo(r) => vec![r.deposit_account_id, r.liability_account_id],
            Self::Journal(r) => r.lines.iter().map(|l| l.account_id).collect(),
            Self::SalesReceipt(r) => vec![r.deposit_account_id],
            Self::InvoicePayment(r) => vec![r.asset_account_id, r.ar_account_id],
            Self::AppliedDiscount(r) => vec![r.income_account_id, r.ar_account_id],
        }
    }

    /// Items the document names.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        match self {
            Self::Invoice(r) => r.items.iter().map(|l| l.item_id).collect(),
            Self::SalesReceipt(r) => r.items.iter().map(|l| l.item_id).collect(),
            Self::Check(_)
            | Self::CreditMemo(_)
            | Self::Journal(_)
            | Self::InvoicePayment(_)
            | Self::AppliedDiscount(_) => Vec::new(),
        }
    }

    /// Compiles the document into balanced splits.
    ///
    /// # Errors
    ///
    /// Returns the compiler's error unchanged.
    pub fn compile(
        &self,
        resolved: &ResolvedAccounts,
        policy: BalancingPolicy,
    ) -> Result<CompiledDocument, LedgerError> {
        match self {
            Self::Invoice(r) => compile_invoice(r, resolved, policy),
            Self::Check(r) => compile_check(r, resolved),
            Self::CreditMemo(r) => compile_credit_memo(r, resolved),
            Self::Journal(r) => compile_journal(r, resolved),
            Self::SalesReceipt(r) => compile_sales_receipt(r, resolved, policy),
            Self::InvoicePayment(r) => compile_invoice_payment(r, resolved),
            Self::AppliedDiscount(r) => compile_applied_discount(r, resolved),
        }
    }
}
