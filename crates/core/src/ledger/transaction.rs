//! Transaction header aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{BuildingId, TransactionId, UnitId, UserId};

use super::split::Split;
use super::types::{DocumentType, TransactionStatus, TransactionTotals};

/// Header fields a document contributes to its transaction.
///
/// These are the only header fields that change on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Posting date.
    pub transaction_date: NaiveDate,
    /// Free-text memo.
    pub memo: Option<String>,
    /// External reference number.
    pub reference: Option<String>,
    /// Unit the document belongs to.
    pub unit_id: Option<UnitId>,
}

/// Header record for one posting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Document that produced the transaction.
    pub document_type: DocumentType,
    /// Posting date.
    pub transaction_date: NaiveDate,
    /// Free-text memo.
    pub memo: Option<String>,
    /// External reference number.
    pub reference: Option<String>,
    /// Current status.
    pub status: TransactionStatus,
    /// Owning building.
    pub building_id: BuildingId,
    /// User who posted the transaction.
    pub created_by: UserId,
    /// Unit the document belongs to.
    pub unit_id: Option<UnitId>,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// When the transaction was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates an active transaction.
    #[must_use]
    pub fn new(
        document_type: DocumentType,
        header: TransactionHeader,
        building_id: BuildingId,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            document_type,
            transaction_date: header.transaction_date,
            memo: header.memo,
            reference: header.reference,
            status: TransactionStatus::Active,
            building_id,
            created_by,
            unit_id: header.unit_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies edited header fields.
    pub fn apply_header(&mut self, header: TransactionHeader, now: DateTime<Utc>) {
        self.transaction_date = header.transaction_date;
        self.memo = header.memo;
        self.reference = header.reference;
        self.unit_id = header.unit_id;
        self.updated_at = now;
    }

    /// Returns true if the transaction counts towards balances.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Returns true if the transaction can be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }
}

/// Sums the active splits of one transaction.
#[must_use]
pub fn totals(splits: &[Split]) -> TransactionTotals {
    let (debit, credit) = splits
        .iter()
        .filter(|s| s.is_active())
        .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), s| {
            (d + s.debit_amount(), c + s.credit_amount())
        });
    TransactionTotals::new(debit, credit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::split::SplitCandidate;
    use crate::ledger::types::RecordStatus;
    use propledger_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn header() -> TransactionHeader {
        TransactionHeader {
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            memo: Some("March rent".into()),
            reference: None,
            unit_id: None,
        }
    }

    #[test]
    fn test_new_transaction_is_active() {
        let tx = Transaction::new(
            DocumentType::Invoice,
            header(),
            BuildingId::new(),
            UserId::new(),
            Utc::now(),
        );
        assert!(tx.is_active());
        assert!(tx.is_editable());
        assert_eq!(tx.memo.as_deref(), Some("March rent"));
    }

    #[test]
    fn test_apply_header_replaces_fields() {
        let mut tx = Transaction::new(
            DocumentType::Journal,
            header(),
            BuildingId::new(),
            UserId::new(),
            Utc::now(),
        );
        let mut edited = header();
        edited.memo = None;
        edited.reference = Some("REF-9".into());
        tx.apply_header(edited, Utc::now());

        assert_eq!(tx.memo, None);
        assert_eq!(tx.reference.as_deref(), Some("REF-9"));
    }

    #[test]
    fn test_totals_ignore_superseded_splits() {
        let tx_id = TransactionId::new();
        let now = Utc::now();
        let a = AccountId::new();
        let b = AccountId::new();
        let mut old = Split::from_candidate(tx_id, 1, &SplitCandidate::debit(a, dec!(500)), now);
        old.status = RecordStatus::Superseded;
        let splits = vec![
            old,
            Split::from_candidate(tx_id, 1, &SplitCandidate::debit(a, dec!(60)), now),
            Split::from_candidate(tx_id, 2, &SplitCandidate::credit(b, dec!(60)), now),
        ];

        let totals = totals(&splits);
        assert_eq!(totals.debit, dec!(60));
        assert_eq!(totals.credit, dec!(60));
        assert!(totals.is_balanced);
    }
}
