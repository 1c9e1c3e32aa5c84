//! In-memory ledger store.
//!
//! Writers buffer their operations and apply them to a copy of the state at
//! commit, swapping it in under one lock. Readers therefore see either all
//! of a posting or none of it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use propledger_shared::types::{
    AppliedCreditId, BuildingId, DocumentId, TransactionId,
};

use super::store::{LedgerStore, LedgerWriter, Posting, PostingQuery};
use crate::ledger::{
    AppliedCredit, DocumentLine, DocumentRecord, DocumentType, LedgerError, RecordStatus,
    RowFilter, Split, Transaction,
};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    transactions: HashMap<TransactionId, Transaction>,
    splits: Vec<Split>,
    documents: HashMap<DocumentId, DocumentRecord>,
    lines: Vec<DocumentLine>,
    applied: Vec<AppliedCredit>,
}

#[derive(Debug, Clone)]
enum WriteOp {
    InsertTransaction(Transaction),
    UpdateTransaction(Transaction),
    InsertSplits(Vec<Split>),
    SupersedeSplits(TransactionId),
    InsertDocument(DocumentRecord),
    UpdateDocument(DocumentRecord),
    InsertLines(Vec<DocumentLine>),
    SupersedeLines(DocumentId),
    InsertApplied(AppliedCredit),
    SupersedeApplied(AppliedCreditId),
}

impl LedgerState {
    fn apply(&mut self, op: WriteOp) -> Result<(), LedgerError> {
        match op {
            WriteOp::InsertTransaction(tx) => {
                if self.transactions.contains_key(&tx.id) {
                    return Err(duplicate_key("transactions", tx.id));
                }
                self.transactions.insert(tx.id, tx);
            }
            WriteOp::UpdateTransaction(tx) => {
                let slot = self
                    .transactions
                    .get_mut(&tx.id)
                    .ok_or(LedgerError::TransactionNotFound(tx.id))?;
                *slot = tx;
            }
            WriteOp::InsertSplits(splits) => {
                for split in &splits {
                    if !self.transactions.contains_key(&split.transaction_id) {
                        return Err(LedgerError::TransactionNotFound(split.transaction_id));
                    }
                }
                self.splits.extend(splits);
            }
            WriteOp::SupersedeSplits(transaction_id) => {
                self.splits
                    .iter_mut()
                    .filter(|s| s.transaction_id == transaction_id)
                    .for_each(|s| s.status = RecordStatus::Superseded);
            }
            WriteOp::InsertDocument(doc) => {
                if self.documents.contains_key(&doc.id) {
                    return Err(duplicate_key("documents", doc.id));
                }
                if !self.transactions.contains_key(&doc.transaction_id) {
                    return Err(LedgerError::TransactionNotFound(doc.transaction_id));
                }
                self.documents.insert(doc.id, doc);
            }
            WriteOp::UpdateDocument(doc) => {
                let slot = self
                    .documents
                    .get_mut(&doc.id)
                    .ok_or(LedgerError::DocumentNotFound(doc.id))?;
                *slot = doc;
            }
            WriteOp::InsertLines(lines) => {
                for line in &lines {
                    if !self.documents.contains_key(&line.document_id) {
                        return Err(LedgerError::DocumentNotFound(line.document_id));
                    }
                }
                self.lines.extend(lines);
            }
            WriteOp::SupersedeLines(document_id) => {
                self.lines
                    .iter_mut()
                    .filter(|l| l.document_id == document_id)
                    .for_each(|l| l.status = RecordStatus::Superseded);
            }
            WriteOp::InsertApplied(row) => self.applied.push(row),
            WriteOp::SupersedeApplied(id) => {
                let row = self
                    .applied
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(LedgerError::AppliedCreditNotFound(id))?;
                row.status = RecordStatus::Superseded;
            }
        }
        Ok(())
    }

    /// Mirrors the partial unique index on active document numbers.
    fn check_unique_numbers(&self) -> Result<(), LedgerError> {
        let mut seen: HashSet<(BuildingId, DocumentType, &str)> = HashSet::new();
        for doc in self.documents.values().filter(|d| d.is_active()) {
            if let Some(number) = doc.number.as_deref()
                && !seen.insert((doc.building_id, doc.document_type, number))
            {
                return Err(LedgerError::DuplicateNumber {
                    document_type: doc.document_type,
                    number: number.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn duplicate_key(table: &str, id: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("duplicate key {id} in {table}"))
}

/// Failures to inject into the next writer.
#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    fail_after_writes: Option<usize>,
    fail_commit: bool,
}

/// In-memory [`LedgerStore`] for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
    faults: Arc<Mutex<Faults>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next writer fail every write after the first `writes`.
    pub fn fail_writes_after(&self, writes: usize) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_after_writes = Some(writes);
    }

    /// Makes the next writer fail at commit.
    pub fn fail_next_commit(&self) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_commit = true;
    }

    /// Number of transaction headers, whatever their status.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.read().transactions.len()
    }

    /// Number of split rows, whatever their status.
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.read().splits.len()
    }

    /// Number of document rows, whatever their status.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.read().documents.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Writer = MemoryLedgerWriter;

    async fn begin(&self) -> Result<Self::Writer, LedgerError> {
        let faults =
            std::mem::take(&mut *self.faults.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(MemoryLedgerWriter {
            state: Arc::clone(&self.state),
            ops: Vec::new(),
            faults,
        })
    }

    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.read().transactions.get(&id).cloned())
    }

    async fn splits(
        &self,
        transaction_id: TransactionId,
        filter: RowFilter,
    ) -> Result<Vec<Split>, LedgerError> {
        Ok(self
            .read()
            .splits
            .iter()
            .filter(|s| s.transaction_id == transaction_id && filter.admits(s.status))
            .cloned()
            .collect())
    }

    async fn document(&self, id: DocumentId) -> Result<Option<DocumentRecord>, LedgerError> {
        Ok(self.read().documents.get(&id).cloned())
    }

    async fn document_by_number(
        &self,
        building_id: BuildingId,
        document_type: DocumentType,
        number: &str,
    ) -> Result<Option<DocumentRecord>, LedgerError> {
        Ok(self
            .read()
            .documents
            .values()
            .find(|d| {
                d.is_active()
                    && d.building_id == building_id
                    && d.document_type == document_type
                    && d.number.as_deref() == Some(number)
            })
            .cloned())
    }

    async fn document_lines(
        &self,
        document_id: DocumentId,
        filter: RowFilter,
    ) -> Result<Vec<DocumentLine>, LedgerError> {
        Ok(self
            .read()
            .lines
            .iter()
            .filter(|l| l.document_id == document_id && filter.admits(l.status))
            .cloned()
            .collect())
    }

    async fn applied_credits(
        &self,
        credit_memo_id: DocumentId,
    ) -> Result<Vec<AppliedCredit>, LedgerError> {
        Ok(self
            .read()
            .applied
            .iter()
            .filter(|a| a.credit_memo_id == credit_memo_id)
            .cloned()
            .collect())
    }

    async fn applied_credit(
        &self,
        id: AppliedCreditId,
    ) -> Result<Option<AppliedCredit>, LedgerError> {
        Ok(self.read().applied.iter().find(|a| a.id == id).cloned())
    }

    async fn postings(&self, query: &PostingQuery) -> Result<Vec<Posting>, LedgerError> {
        let state = self.read();
        let mut postings: Vec<Posting> = state
            .splits
            .iter()
            .filter(|s| s.is_active())
            .filter(|s| query.account_id.is_none_or(|a| a == s.account_id))
            .filter_map(|s| {
                let tx = state.transactions.get(&s.transaction_id)?;
                let in_scope = tx.is_active()
                    && query.building_id.is_none_or(|b| b == tx.building_id)
                    && query.window.contains(tx.transaction_date);
                in_scope.then(|| Posting {
                    split: s.clone(),
                    transaction_date: tx.transaction_date,
                    document_type: tx.document_type,
                    memo: tx.memo.clone(),
                    reference: tx.reference.clone(),
                    building_id: tx.building_id,
                    transaction_created_at: tx.created_at,
                })
            })
            .collect();
        postings.sort_by_key(Posting::sort_key);
        Ok(postings)
    }
}

/// Unit of work over a [`MemoryLedgerStore`].
#[derive(Debug)]
pub struct MemoryLedgerWriter {
    state: Arc<RwLock<LedgerState>>,
    ops: Vec<WriteOp>,
    faults: Faults,
}

impl MemoryLedgerWriter {
    fn push(&mut self, op: WriteOp) -> Result<(), LedgerError> {
        if let Some(limit) = self.faults.fail_after_writes
            && self.ops.len() >= limit
        {
            return Err(LedgerError::Storage(format!(
                "write {} rejected by the store",
                self.ops.len() + 1
            )));
        }
        self.ops.push(op);
        Ok(())
    }
}

#[async_trait]
impl LedgerWriter for MemoryLedgerWriter {
    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError> {
        self.push(WriteOp::InsertTransaction(transaction.clone()))
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError> {
        self.push(WriteOp::UpdateTransaction(transaction.clone()))
    }

    async fn insert_splits(&mut self, splits: &[Split]) -> Result<(), LedgerError> {
        self.push(WriteOp::InsertSplits(splits.to_vec()))
    }

    async fn supersede_splits(&mut self, transaction_id: TransactionId) -> Result<(), LedgerError> {
        self.push(WriteOp::SupersedeSplits(transaction_id))
    }

    async fn insert_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError> {
        self.push(WriteOp::InsertDocument(document.clone()))
    }

    async fn update_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError> {
        self.push(WriteOp::UpdateDocument(document.clone()))
    }

    async fn insert_document_lines(&mut self, lines: &[DocumentLine]) -> Result<(), LedgerError> {
        self.push(WriteOp::InsertLines(lines.to_vec()))
    }

    async fn supersede_document_lines(
        &mut self,
        document_id: DocumentId,
    ) -> Result<(), LedgerError> {
        self.push(WriteOp::SupersedeLines(document_id))
    }

    async fn insert_applied_credit(&mut self, row: &AppliedCredit) -> Result<(), LedgerError> {
        self.push(WriteOp::InsertApplied(row.clone()))
    }

    async fn supersede_applied_credit(&mut self, id: AppliedCreditId) -> Result<(), LedgerError> {
        self.push(WriteOp::SupersedeApplied(id))
    }

    async fn commit(self) -> Result<(), LedgerError> {
        if self.faults.fail_commit {
            return Err(LedgerError::Storage("commit rejected by the store".to_string()));
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = state.clone();
        for op in self.ops {
            next.apply(op)?;
        }
        next.check_unique_numbers()?;
        *state = next;
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SplitCandidate, TransactionHeader, TransactionStatus};
    use crate::posting::store::DateWindow;
    use crate::testing::date;
    use chrono::Utc;
    use propledger_shared::types::{AccountId, UserId};
    use rust_decimal_macros::dec;

    fn transaction(building_id: BuildingId) -> Transaction {
        Transaction::new(
            DocumentType::Journal,
            TransactionHeader {
                transaction_date: date(2024, 1, 15),
                memo: None,
                reference: None,
                unit_id: None,
            },
            building_id,
            UserId::new(),
            Utc::now(),
        )
    }

    fn document(tx: &Transaction, number: &str) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::new(),
            document_type: tx.document_type,
            building_id: tx.building_id,
            transaction_id: tx.id,
            number: Some(number.to_string()),
            party_id: None,
            unit_id: None,
            document_date: tx.transaction_date,
            amount: dec!(10),
            invoice_id: None,
            payload: serde_json::Value::Null,
            status: TransactionStatus::Active,
            created_by: tx.created_by,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }

    fn splits(tx: &Transaction, a: AccountId, b: AccountId) -> Vec<Split> {
        let now = Utc::now();
        vec![
            Split::from_candidate(tx.id, 1, &SplitCandidate::debit(a, dec!(10)), now),
            Split::from_candidate(tx.id, 2, &SplitCandidate::credit(b, dec!(10)), now),
        ]
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = MemoryLedgerStore::new();
        let tx = transaction(BuildingId::new());
        let mut writer = store.begin().await.unwrap();
        writer.insert_transaction(&tx).await.unwrap();
        writer
            .insert_splits(&splits(&tx, AccountId::new(), AccountId::new()))
            .await
            .unwrap();

        assert!(store.transaction(tx.id).await.unwrap().is_none());
        writer.commit().await.unwrap();
        assert!(store.transaction(tx.id).await.unwrap().is_some());
        assert_eq!(store.splits(tx.id, RowFilter::ActiveOnly).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryLedgerStore::new();
        let tx = transaction(BuildingId::new());
        let mut writer = store.begin().await.unwrap();
        writer.insert_transaction(&tx).await.unwrap();
        writer.rollback().await.unwrap();
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_supersede_keeps_rows() {
        let store = MemoryLedgerStore::new();
        let tx = transaction(BuildingId::new());
        let (a, b) = (AccountId::new(), AccountId::new());
        let mut writer = store.begin().await.unwrap();
        writer.insert_transaction(&tx).await.unwrap();
        writer.insert_splits(&splits(&tx, a, b)).await.unwrap();
        writer.commit().await.unwrap();

        let mut writer = store.begin().await.unwrap();
        writer.supersede_splits(tx.id).await.unwrap();
        writer.insert_splits(&splits(&tx, a, b)).await.unwrap();
        writer.commit().await.unwrap();

        assert_eq!(store.splits(tx.id, RowFilter::ActiveOnly).await.unwrap().len(), 2);
        assert_eq!(store.splits(tx.id, RowFilter::All).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_commit_enforces_unique_numbers() {
        let store = MemoryLedgerStore::new();
        let building = BuildingId::new();
        for expect_ok in [true, false] {
            let tx = transaction(building);
            let mut writer = store.begin().await.unwrap();
            writer.insert_transaction(&tx).await.unwrap();
            writer.insert_document(&document(&tx, "JE-1")).await.unwrap();
            assert_eq!(writer.commit().await.is_ok(), expect_ok);
        }
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = MemoryLedgerStore::new();
        store.fail_writes_after(1);
        let tx = transaction(BuildingId::new());
        let mut writer = store.begin().await.unwrap();
        writer.insert_transaction(&tx).await.unwrap();
        let err = writer
            .insert_splits(&splits(&tx, AccountId::new(), AccountId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));

        // faults apply to one writer only
        let writer = store.begin().await.unwrap();
        assert!(writer.commit().await.is_ok());
    }

    #[tokio::test]
    async fn test_postings_filter_and_order() {
        let store = MemoryLedgerStore::new();
        let building = BuildingId::new();
        let (a, b) = (AccountId::new(), AccountId::new());

        let mut early = transaction(building);
        early.transaction_date = date(2024, 1, 1);
        let late = transaction(building);
        let mut voided = transaction(building);
        voided.status = TransactionStatus::Voided;
        let other_building = transaction(BuildingId::new());

        let mut writer = store.begin().await.unwrap();
        for tx in [&late, &early, &voided, &other_building] {
            writer.insert_transaction(tx).await.unwrap();
            writer.insert_splits(&splits(tx, a, b)).await.unwrap();
        }
        writer.commit().await.unwrap();

        let query = PostingQuery::new(DateWindow::Through(date(2024, 12, 31)))
            .account(a)
            .building(Some(building));
        let postings = store.postings(&query).await.unwrap();
        let ids: Vec<TransactionId> = postings.iter().map(|p| p.split.transaction_id).collect();
        assert_eq!(ids, vec![early.id, late.id]);

        let query = PostingQuery::new(DateWindow::Before(date(2024, 1, 15)));
        assert_eq!(store.postings(&query).await.unwrap().len(), 2);
    }
}
