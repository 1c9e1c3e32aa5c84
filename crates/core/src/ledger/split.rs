//! Ledger split domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{AccountId, PartyId, SplitId, TransactionId, UnitId};

use super::types::{EntryType, RecordStatus};

/// A split produced by a document compiler, before it is persisted.
///
/// The amount is always positive; the side is carried by `entry_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCandidate {
    /// The account affected by this split.
    pub account_id: AccountId,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Customer or vendor, required on AR/AP accounts.
    pub party_id: Option<PartyId>,
    /// Unit the line is tracked against.
    pub unit_id: Option<UnitId>,
    /// Optional line memo.
    pub memo: Option<String>,
}

impl SplitCandidate {
    /// Creates a candidate on the given side.
    #[must_use]
    pub fn new(account_id: AccountId, entry_type: EntryType, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type,
            amount,
            party_id: None,
            unit_id: None,
            memo: None,
        }
    }

    /// Creates a debit candidate.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, EntryType::Debit, amount)
    }

    /// Creates a credit candidate.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, EntryType::Credit, amount)
    }

    /// Sets the counterpart party.
    #[must_use]
    pub fn with_party(mut self, party_id: Option<PartyId>) -> Self {
        self.party_id = party_id;
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit_id: Option<UnitId>) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: Option<String>) -> Self {
        self.memo = memo;
        self
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }
}

/// A persisted ledger line.
///
/// Exactly one of `debit` and `credit` is set on a well-formed split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Unique identifier for this split.
    pub id: SplitId,
    /// The transaction this split belongs to.
    pub transaction_id: TransactionId,
    /// Order within the batch it was written in, starting at 1.
    pub position: i32,
    /// The account affected by this split.
    pub account_id: AccountId,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Unit the line is tracked against.
    pub unit_id: Option<UnitId>,
    /// Debit amount.
    pub debit: Option<Decimal>,
    /// Credit amount.
    pub credit: Option<Decimal>,
    /// Optional line memo.
    pub memo: Option<String>,
    /// Active or superseded.
    pub status: RecordStatus,
    /// When the split was written.
    pub created_at: DateTime<Utc>,
}

impl Split {
    /// Builds an active split from a compiled candidate.
    #[must_use]
    pub fn from_candidate(
        transaction_id: TransactionId,
        position: i32,
        candidate: &SplitCandidate,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (debit, credit) = match candidate.entry_type {
            EntryType::Debit => (Some(candidate.amount), None),
            EntryType::Credit => (None, Some(candidate.amount)),
        };
        Self {
            id: SplitId::new(),
            transaction_id,
            position,
            account_id: candidate.account_id,
            party_id: candidate.party_id,
            unit_id: candidate.unit_id,
            debit,
            credit,
            memo: candidate.memo.clone(),
            status: RecordStatus::Active,
            created_at,
        }
    }

    /// Returns the populated side, or `None` if both or neither are set.
    #[must_use]
    pub fn side(&self) -> Option<(EntryType, Decimal)> {
        match (self.debit, self.credit) {
            (Some(amount), None) => Some((EntryType::Debit, amount)),
            (None, Some(amount)) => Some((EntryType::Credit, amount)),
            _ => None,
        }
    }

    /// Debit amount, zero when the split is a credit.
    #[must_use]
    pub fn debit_amount(&self) -> Decimal {
        self.debit.unwrap_or(Decimal::ZERO)
    }

    /// Credit amount, zero when the split is a debit.
    #[must_use]
    pub fn credit_amount(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO)
    }

    /// Returns true if the split is part of the current batch.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}
