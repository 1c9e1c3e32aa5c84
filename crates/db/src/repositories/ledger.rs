//! `SeaORM` ledger store.
//!
//! Reads run against the pooled connection and see committed rows only.
//! Each [`SeaLedgerWriter`] wraps one database transaction, so the deferred
//! balance trigger runs when the writer commits.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, warn};

use propledger_core::ledger::{
    AppliedCredit, DocumentLine, DocumentRecord, DocumentType, LedgerError, RowFilter, Split,
    Transaction,
};
use propledger_core::posting::{DateWindow, LedgerStore, LedgerWriter, Posting, PostingQuery};
use propledger_shared::types::{AppliedCreditId, BuildingId, DocumentId, TransactionId};

use super::convert::{
    applied_credit_active, applied_credit_from_model, document_active, document_from_model,
    duplicate_or_storage, line_active, line_from_model, split_active, split_from_model, storage,
    transaction_active, transaction_from_model,
};
use crate::entities::{
    applied_credits, document_lines, documents, sea_orm_active_enums as db, splits, transactions,
};

/// Ledger store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct SeaLedgerStore {
    db: DatabaseConnection,
}

impl SeaLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for SeaLedgerStore {
    type Writer = SeaLedgerWriter;

    async fn begin(&self) -> Result<SeaLedgerWriter, LedgerError> {
        let txn = self.db.begin().await.map_err(storage)?;
        Ok(SeaLedgerWriter { txn })
    }

    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let model = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(transaction_from_model))
    }

    async fn splits(
        &self,
        transaction_id: TransactionId,
        filter: RowFilter,
    ) -> Result<Vec<Split>, LedgerError> {
        let mut query = splits::Entity::find()
            .filter(splits::Column::TransactionId.eq(transaction_id.into_inner()));
        if filter == RowFilter::ActiveOnly {
            query = query.filter(splits::Column::Status.eq(db::RecordStatus::Active));
        }
        let models = query
            .order_by_asc(splits::Column::CreatedAt)
            .order_by_asc(splits::Column::Position)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(split_from_model).collect())
    }

    async fn document(&self, id: DocumentId) -> Result<Option<DocumentRecord>, LedgerError> {
        let model = documents::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(document_from_model))
    }

    async fn document_by_number(
        &self,
        building_id: BuildingId,
        document_type: DocumentType,
        number: &str,
    ) -> Result<Option<DocumentRecord>, LedgerError> {
        let model = documents::Entity::find()
            .filter(documents::Column::BuildingId.eq(building_id.into_inner()))
            .filter(documents::Column::DocumentType.eq(db::DocumentType::from(document_type)))
            .filter(documents::Column::Number.eq(number))
            .filter(documents::Column::Status.eq(db::TransactionStatus::Active))
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(document_from_model))
    }

    async fn document_lines(
        &self,
        document_id: DocumentId,
        filter: RowFilter,
    ) -> Result<Vec<DocumentLine>, LedgerError> {
        let mut query = document_lines::Entity::find()
            .filter(document_lines::Column::DocumentId.eq(document_id.into_inner()));
        if filter == RowFilter::ActiveOnly {
            query = query.filter(document_lines::Column::Status.eq(db::RecordStatus::Active));
        }
        let models = query
            .order_by_asc(document_lines::Column::CreatedAt)
            .order_by_asc(document_lines::Column::Position)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(line_from_model).collect())
    }

    async fn applied_credits(
        &self,
        credit_memo_id: DocumentId,
    ) -> Result<Vec<AppliedCredit>, LedgerError> {
        let models = applied_credits::Entity::find()
            .filter(applied_credits::Column::CreditMemoId.eq(credit_memo_id.into_inner()))
            .order_by_asc(applied_credits::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(applied_credit_from_model).collect())
    }

    async fn applied_credit(
        &self,
        id: AppliedCreditId,
    ) -> Result<Option<AppliedCredit>, LedgerError> {
        let model = applied_credits::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(applied_credit_from_model))
    }

    async fn postings(&self, query: &PostingQuery) -> Result<Vec<Posting>, LedgerError> {
        let mut select = splits::Entity::find()
            .find_also_related(transactions::Entity)
            .filter(splits::Column::Status.eq(db::RecordStatus::Active))
            .filter(transactions::Column::Status.eq(db::TransactionStatus::Active));

        if let Some(account_id) = query.account_id {
            select = select.filter(splits::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(building_id) = query.building_id {
            select = select.filter(transactions::Column::BuildingId.eq(building_id.into_inner()));
        }
        select = match query.window {
            DateWindow::Through(end) => {
                select.filter(transactions::Column::TransactionDate.lte(end))
            }
            DateWindow::Before(end) => select.filter(transactions::Column::TransactionDate.lt(end)),
            DateWindow::Between(start, end) => {
                select.filter(transactions::Column::TransactionDate.between(start, end))
            }
        };

        let rows = select
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(splits::Column::TransactionId)
            .order_by_asc(splits::Column::Position)
            .all(&self.db)
            .await
            .map_err(storage)?;

        let postings = rows
            .into_iter()
            .filter_map(|(split, tx)| {
                let tx = transaction_from_model(tx?);
                Some(Posting {
                    split: split_from_model(split),
                    transaction_date: tx.transaction_date,
                    document_type: tx.document_type,
                    memo: tx.memo,
                    reference: tx.reference,
                    building_id: tx.building_id,
                    transaction_created_at: tx.created_at,
                })
            })
            .collect();
        Ok(postings)
    }
}

/// One database transaction's worth of ledger writes.
pub struct SeaLedgerWriter {
    txn: DatabaseTransaction,
}

#[async_trait]
impl LedgerWriter for SeaLedgerWriter {
    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError> {
        transaction_active(transaction)
            .insert(&self.txn)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), LedgerError> {
        let mut model = transaction_active(transaction);
        model.created_at = NotSet;
        model.created_by = NotSet;
        model.document_type = NotSet;
        model.building_id = NotSet;
        let result = transactions::Entity::update_many()
            .set(model)
            .filter(transactions::Column::Id.eq(transaction.id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::TransactionNotFound(transaction.id));
        }
        Ok(())
    }

    async fn insert_splits(&mut self, splits: &[Split]) -> Result<(), LedgerError> {
        if splits.is_empty() {
            return Ok(());
        }
        splits::Entity::insert_many(splits.iter().map(split_active))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn supersede_splits(&mut self, transaction_id: TransactionId) -> Result<(), LedgerError> {
        let result = splits::Entity::update_many()
            .set(splits::ActiveModel {
                status: Set(db::RecordStatus::Superseded),
                ..Default::default()
            })
            .filter(splits::Column::TransactionId.eq(transaction_id.into_inner()))
            .filter(splits::Column::Status.eq(db::RecordStatus::Active))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        debug!(
            transaction_id = %transaction_id,
            count = result.rows_affected,
            "Superseded splits"
        );
        Ok(())
    }

    async fn insert_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError> {
        document_active(document)
            .insert(&self.txn)
            .await
            .map_err(|e| {
                duplicate_or_storage(e, document.document_type, document.number.as_deref())
            })?;
        Ok(())
    }

    async fn update_document(&mut self, document: &DocumentRecord) -> Result<(), LedgerError> {
        let mut model = document_active(document);
        model.created_at = NotSet;
        model.created_by = NotSet;
        let result = documents::Entity::update_many()
            .set(model)
            .filter(documents::Column::Id.eq(document.id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(|e| {
                duplicate_or_storage(e, document.document_type, document.number.as_deref())
            })?;
        if result.rows_affected == 0 {
            return Err(LedgerError::DocumentNotFound(document.id));
        }
        Ok(())
    }

    async fn insert_document_lines(&mut self, lines: &[DocumentLine]) -> Result<(), LedgerError> {
        if lines.is_empty() {
            return Ok(());
        }
        document_lines::Entity::insert_many(lines.iter().map(line_active))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn supersede_document_lines(
        &mut self,
        document_id: DocumentId,
    ) -> Result<(), LedgerError> {
        let result = document_lines::Entity::update_many()
            .set(document_lines::ActiveModel {
                status: Set(db::RecordStatus::Superseded),
                ..Default::default()
            })
            .filter(document_lines::Column::DocumentId.eq(document_id.into_inner()))
            .filter(document_lines::Column::Status.eq(db::RecordStatus::Active))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        debug!(
            document_id = %document_id,
            count = result.rows_affected,
            "Superseded document lines"
        );
        Ok(())
    }

    async fn insert_applied_credit(&mut self, row: &AppliedCredit) -> Result<(), LedgerError> {
        applied_credit_active(row)
            .insert(&self.txn)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn supersede_applied_credit(&mut self, id: AppliedCreditId) -> Result<(), LedgerError> {
        let result = applied_credits::Entity::update_many()
            .set(applied_credits::ActiveModel {
                status: Set(db::RecordStatus::Superseded),
                ..Default::default()
            })
            .filter(applied_credits::Column::Id.eq(id.into_inner()))
            .filter(applied_credits::Column::Status.eq(db::RecordStatus::Active))
            .exec(&self.txn)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::AppliedCreditNotFound(id));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        // The deferred balance trigger fires here.
        self.txn.commit().await.map_err(|e| {
            warn!(error = %e, "Ledger commit rejected");
            storage(e)
        })
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        self.txn.rollback().await.map_err(storage)
    }
}

impl std::fmt::Debug for SeaLedgerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeaLedgerWriter").finish_non_exhaustive()
    }
}
