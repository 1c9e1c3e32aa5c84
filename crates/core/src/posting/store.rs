//! Ledger store traits.
//!
//! A [`LedgerStore`] serves committed reads and hands out [`LedgerWriter`]
//! units of work. Every write goes through a writer and becomes visible
//! only when the writer commits; a writer dropped without committing
//! discards its writes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use propledger_shared::types::{
    AccountId, AppliedCreditId, BuildingId, DocumentId, TransactionId,
};

use crate::ledger::{
    AppliedCredit, DocumentLine, DocumentRecord, DocumentType, LedgerError, RowFilter, Split,
    Transaction,
};

/// Which transaction dates a posting query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    /// On or before the date.
    Through(NaiveDate),
    /// Strictly before the date.
    Before(NaiveDate),
    /// Between the dates, both inclusive.
    Between(NaiveDate, NaiveDate),
}

impl DateWindow {
    /// Returns true if `date` falls in the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Through(end) => date <= end,
            Self::Before(end) => date < end,
            Self::Between(start, end) => start <= date && date <= end,
        }
    }
}

/// Selects active splits of active transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingQuery {
    /// Restrict to one account.
    pub account_id: Option<AccountId>,
    /// Restrict to one building.
    pub building_id: Option<BuildingId>,
    /// Transaction date window.
    pub window: DateWindow,
}

impl PostingQuery {
    /// All accounts and buildings in the window.
    #[must_use]
    pub fn new(window: DateWindow) -> Self {
        Self {
            account_id: None,
            building_id: None,
            window,
        }
    }

    /// Restricts the query to one account.
    #[must_use]
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Restricts the query to one building, if given.
    #[must_use]
    pub fn building(mut self, building_id: Option<BuildingId>) -> Self {
        self.building_id = building_id;
        self
    }
}

/// A split joined with the header fields reports need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The split.
    pub split: Split,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document type of the transaction.
    pub document_type: DocumentType,
    /// Transaction memo.
    pub memo: Option<String>,
    /// Transaction reference.
    pub reference: Option<String>,
    /// Building of the transaction.
    pub building_id: BuildingId,
    /// Creation time of the transaction, for stable ordering.
    pub transaction_created_at: DateTime<Utc>,
}

impl Posting {
    /// Ordering key: date, transaction creation time, split position.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, DateTime<Utc>, TransactionId, i32) {
        (
            self.transaction_date,
            self.transaction_created_at,
            self.split.transaction_id,
            self.split.position,
        )
    }
}

/// Committed reads plus access to write units of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Unit of work type.
    type Writer: LedgerWriter;

    /// Opens a unit of work.
    async fn begin(&self) -> Result<Self::Writer, LedgerError>;

    /// Fetches a transaction header.
    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError>;

    /// Splits of a transaction, ordered by batch then position.
    async fn splits(
        &self,
        transaction_id: TransactionId,
        filter: RowFilter,
    ) -> Result<Vec<Split>, LedgerError>;

    /// Fetches a document.
    async fn document(&self, id: DocumentId) -> Result<Option<DocumentRecord>, LedgerError>;

    /// Fetches the active document with the given number.
    async fn document_by_number(
        &self,
        building_id: BuildingId,
        document_type: DocumentType,
        number: &str,
    ) -> Result<Option<DocumentRecord>, LedgerError>;

    /// Lines of a document, ordered by batch then position.
    async fn document_lines(
        &self,
        document_id: DocumentId,
        filter: RowFilter,
    ) -> Result<Vec<DocumentLine>, LedgerError>;

    /// Every application of a credit memo, active or not.
    async fn applied_credits(
        &self,
        credit_memo_id: DocumentId,
    ) -> Result<Vec<AppliedCredit>, LedgerError>;

    /// Fetches one applied credit.
    async fn applied_credit(
        &self,
        id: AppliedCreditId,
    ) -> Result<Option<AppliedCredit>, LedgerError>;

    /// Active splits of active transactions matching the query, ordered by
    /// [`Posting::sort_key`].
    async fn postings(&self, query: &PostingQuery) -> Result<Vec<Posting>, LedgerError>;
}

/// One atomic unit of writes.
#[async_trait]
pub trait LedgerWriter: Send {
    /// Inserts a transaction header.
    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError>;

    /// Rewrites a transaction's header fields and status.
    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError>;

    /// Inserts a batch of splits.
    async fn insert_splits(&mut self, splits: &[Split]) -> Result<(), LedgerError>;

    /// Marks every active split of a transaction superseded.
    async fn supersede_splits(&mut self, transaction_id: TransactionId) -> Result<(), LedgerError>;

    /// Inserts a document.
    async fn insert_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError>;

    /// Rewrites a document.
    async fn update_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError>;

    /// Inserts a batch of document lines.
    async fn insert_document_lines(&mut self, lines: &[DocumentLine]) -> Result<(), LedgerError>;

    /// Marks every active line of a document superseded.
    async fn supersede_document_lines(
        &mut self,
        document_id: DocumentId,
    ) -> Result<(), LedgerError>;

    /// Inserts an applied credit.
    async fn insert_applied_credit(&mut self, row: &AppliedCredit) -> Result<(), LedgerError>;

    /// Marks an applied credit superseded.
    async fn supersede_applied_credit(&mut self, id: AppliedCreditId) -> Result<(), LedgerError>;

    /// Makes every write visible at once.
    async fn commit(self) -> Result<(), LedgerError>;

    /// Discards every write.
    async fn rollback(self) -> Result<(), LedgerError>;
}
