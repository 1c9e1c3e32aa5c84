//! Persisted document detail rows.
//!
//! A [`DocumentRecord`] is the business-facing side of a posting: it owns
//! exactly one transaction for its whole lifetime and a batch of
//! [`DocumentLine`]s that were the input to split compilation.
//! [`AppliedCredit`] rows stand alone and never reference a transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{
    AccountId, AppliedCreditId, BuildingId, DocumentId, DocumentLineId, ItemId, PartyId,
    TransactionId, UnitId, UserId,
};

use super::types::{DocumentType, EntryType, RecordStatus, TransactionStatus};

/// Document header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier.
    pub id: DocumentId,
    /// Document type, matches the transaction header.
    pub document_type: DocumentType,
    /// Owning building.
    pub building_id: BuildingId,
    /// The one transaction this document posts through.
    pub transaction_id: TransactionId,
    /// Document number, unique per building and type among active documents.
    pub number: Option<String>,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Unit the document belongs to.
    pub unit_id: Option<UnitId>,
    /// Document date.
    pub document_date: NaiveDate,
    /// Document total.
    pub amount: Decimal,
    /// Invoice a payment or discount is applied to.
    pub invoice_id: Option<DocumentId>,
    /// Snapshot of the request that produced the current lines.
    pub payload: serde_json::Value,
    /// Active or voided.
    pub status: TransactionStatus,
    /// User who created the document.
    pub created_by: UserId,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Returns true if the document is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }
}

/// A document line as produced by a compiler, before it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDraft {
    /// Account named directly on the line.
    pub account_id: Option<AccountId>,
    /// Item named on the line.
    pub item_id: Option<ItemId>,
    /// Line description.
    pub description: Option<String>,
    /// Quantity, when the line is item based.
    pub quantity: Option<Decimal>,
    /// Rate exactly as entered.
    pub rate: Option<String>,
    /// Line amount, rounded to cents.
    pub amount: Decimal,
    /// Side, for journal lines.
    pub entry_type: Option<EntryType>,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Unit.
    pub unit_id: Option<UnitId>,
}

/// Persisted document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Unique identifier.
    pub id: DocumentLineId,
    /// Owning document.
    pub document_id: DocumentId,
    /// Position within its batch, starting at 1.
    pub position: i32,
    /// Account named directly on the line.
    pub account_id: Option<AccountId>,
    /// Item named on the line.
    pub item_id: Option<ItemId>,
    /// Line description.
    pub description: Option<String>,
    /// Quantity.
    pub quantity: Option<Decimal>,
    /// Rate exactly as entered.
    pub rate: Option<String>,
    /// Line amount.
    pub amount: Decimal,
    /// Side, for journal lines.
    pub entry_type: Option<EntryType>,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Unit.
    pub unit_id: Option<UnitId>,
    /// Active or superseded.
    pub status: RecordStatus,
    /// When the line was written.
    pub created_at: DateTime<Utc>,
}

impl DocumentLine {
    /// Builds an active line from a compiled draft.
    #[must_use]
    pub fn from_draft(
        document_id: DocumentId,
        position: i32,
        draft: LineDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DocumentLineId::new(),
            document_id,
            position,
            account_id: draft.account_id,
            item_id: draft.item_id,
            description: draft.description,
            quantity: draft.quantity,
            rate: draft.rate,
            amount: draft.amount,
            entry_type: draft.entry_type,
            party_id: draft.party_id,
            unit_id: draft.unit_id,
            status: RecordStatus::Active,
            created_at,
        }
    }
}

/// Cross-reference applying part of a credit memo to an invoice.
///
/// Has no transaction: applying a credit moves nothing in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCredit {
    /// Unique identifier.
    pub id: AppliedCreditId,
    /// Owning building.
    pub building_id: BuildingId,
    /// Credit memo the amount is drawn from.
    pub credit_memo_id: DocumentId,
    /// Invoice the amount is applied to.
    pub invoice_id: DocumentId,
    /// Applied amount.
    pub amount: Decimal,
    /// Date the credit was applied.
    pub applied_date: NaiveDate,
    /// Active or superseded.
    pub status: RecordStatus,
    /// User who applied the credit.
    pub created_by: UserId,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl AppliedCredit {
    /// Returns true if the row still consumes credit.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// Unapplied balance of a credit memo given its applied rows.
#[must_use]
pub fn available_credit(credit_memo_amount: Decimal, applied: &[AppliedCredit]) -> Decimal {
    let used: Decimal = applied
        .iter()
        .filter(|a| a.is_active())
        .map(|a| a.amount)
        .sum();
    credit_memo_amount - used
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn applied(amount: Decimal, status: RecordStatus) -> AppliedCredit {
        AppliedCredit {
            id: AppliedCreditId::new(),
            building_id: BuildingId::new(),
            credit_memo_id: DocumentId::new(),
            invoice_id: DocumentId::new(),
            amount,
            applied_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            status,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_credit_skips_superseded_rows() {
        let rows = vec![
            applied(dec!(20), RecordStatus::Active),
            applied(dec!(15), RecordStatus::Superseded),
            applied(dec!(5.50), RecordStatus::Active),
        ];
        assert_eq!(available_credit(dec!(50), &rows), dec!(24.50));
        assert_eq!(available_credit(dec!(50), &[]), dec!(50));
    }

    #[test]
    fn test_line_from_draft() {
        let draft = LineDraft {
            description: Some("Plumbing".into()),
            quantity: Some(dec!(2)),
            rate: Some("75.00".into()),
            amount: dec!(150.00),
            ..LineDraft::default()
        };
        let line = DocumentLine::from_draft(DocumentId::new(), 1, draft, Utc::now());
        assert_eq!(line.amount, dec!(150.00));
        assert_eq!(line.rate.as_deref(), Some("75.00"));
        assert_eq!(line.status, RecordStatus::Active);
    }
}
