//! Posting coordinator.
//!
//! Runs every document through validate, compile and one store unit of
//! work: header, detail rows and splits are written together or not at
//! all. Edits supersede the previous lines and splits instead of
//! overwriting them.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use propledger_shared::types::{AppliedCreditId, BuildingId, DocumentId, UserId};

use super::store::{LedgerStore, LedgerWriter};
use crate::accounts::{AccountDirectory, resolve};
use crate::documents::{
    AppliedCreditRequest, BalancingPolicy, CompiledDocument, Document, check_availability,
    check_resize,
};
use crate::ledger::{
    AppliedCredit, DocumentLine, DocumentRecord, DocumentType, LedgerError, RecordStatus,
    RowFilter, Split, Transaction, TransactionStatus, TransactionTotals, available_credit,
    totals,
};

/// Who is posting, and for which building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingContext {
    /// Building every row is written under.
    pub building_id: BuildingId,
    /// Acting user.
    pub user_id: UserId,
}

impl PostingContext {
    /// Creates a context.
    #[must_use]
    pub fn new(building_id: BuildingId, user_id: UserId) -> Self {
        Self {
            building_id,
            user_id,
        }
    }
}

/// A document as read back after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedDocument {
    /// Document header.
    pub document: DocumentRecord,
    /// Active detail lines.
    pub lines: Vec<DocumentLine>,
    /// Transaction header.
    pub transaction: Transaction,
    /// Active splits.
    pub splits: Vec<Split>,
    /// Debit and credit totals of the active splits.
    pub totals: TransactionTotals,
}

/// Writes documents to the ledger.
#[derive(Debug)]
pub struct PostingCoordinator<S, D> {
    store: S,
    directory: D,
    policy: BalancingPolicy,
}

impl<S, D> PostingCoordinator<S, D>
where
    S: LedgerStore,
    D: AccountDirectory,
{
    /// Creates a coordinator over a store and a directory.
    pub fn new(store: S, directory: D, policy: BalancingPolicy) -> Self {
        Self {
            store,
            directory,
            policy,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The balancing policy in force.
    pub fn policy(&self) -> BalancingPolicy {
        self.policy
    }

    /// Posts a new document.
    ///
    /// # Errors
    ///
    /// Validation, reference and invariant errors abort before any write.
    /// A duplicate number is a conflict whether caught before or at commit.
    /// Storage errors roll back every write of the request.
    pub async fn create(
        &self,
        ctx: &PostingContext,
        document: Document,
    ) -> Result<PostedDocument, LedgerError> {
        document.validate()?;
        self.check_number(ctx, &document, None).await?;
        self.check_invoice_reference(ctx, &document).await?;
        let compiled = self.compile(&document).await?;

        let now = Utc::now();
        let document_type = document.document_type();
        let transaction = Transaction::new(
            document_type,
            document.header(),
            ctx.building_id,
            ctx.user_id,
            now,
        );
        let record = DocumentRecord {
            id: DocumentId::new(),
            document_type,
            building_id: ctx.building_id,
            transaction_id: transaction.id,
            number: document.number().map(str::to_string),
            party_id: document.party_id(),
            unit_id: transaction.unit_id,
            document_date: document.date(),
            amount: compiled.total,
            invoice_id: document.invoice_id(),
            payload: snapshot(&document)?,
            status: TransactionStatus::Active,
            created_by: ctx.user_id,
            created_at: now,
            updated_at: now,
        };
        let (lines, splits) = materialize(&record, &transaction, compiled);

        let mut writer = self.store.begin().await?;
        let written = async {
            writer.insert_transaction(&transaction).await?;
            writer.insert_document(&record).await?;
            writer.insert_document_lines(&lines).await?;
            writer.insert_splits(&splits).await
        }
        .await;
        settle(writer, written, record.id).await?;

        info!(
            document_id = %record.id,
            transaction_id = %transaction.id,
            document_type = %document_type,
            splits = splits.len(),
            "document posted"
        );
        self.get(record.id).await
    }

    /// Replaces a document's content.
    ///
    /// Header fields are rewritten in place; the previous lines and splits
    /// are superseded and the recompiled ones inserted as active.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create), plus `DocumentTypeMismatch` when the
    /// new content is of another type, `DocumentVoided` for a voided
    /// document and `InsufficientCredit` when a credit memo would drop
    /// below the amount already applied from it.
    pub async fn update(
        &self,
        ctx: &PostingContext,
        id: DocumentId,
        document: Document,
    ) -> Result<PostedDocument, LedgerError> {
        document.validate()?;
        let mut record = self.load_document(ctx, id).await?;
        if record.document_type != document.document_type() {
            return Err(LedgerError::DocumentTypeMismatch {
                document_id: id,
                expected: record.document_type,
                actual: document.document_type(),
            });
        }
        if !record.is_active() {
            return Err(LedgerError::DocumentVoided(id));
        }
        self.check_number(ctx, &document, Some(id)).await?;
        self.check_invoice_reference(ctx, &document).await?;
        let compiled = self.compile(&document).await?;
        if record.document_type == DocumentType::CreditMemo {
            let applied = self.store.applied_credits(id).await?;
            check_resize(id, &applied, compiled.total)?;
        }

        let now = Utc::now();
        let mut transaction = self.load_transaction(&record).await?;
        transaction.apply_header(document.header(), now);

        record.number = document.number().map(str::to_string);
        record.party_id = document.party_id();
        record.unit_id = transaction.unit_id;
        record.document_date = document.date();
        record.amount = compiled.total;
        record.invoice_id = document.invoice_id();
        record.payload = snapshot(&document)?;
        record.updated_at = now;
        let (lines, splits) = materialize(&record, &transaction, compiled);

        let mut writer = self.store.begin().await?;
        let written = async {
            writer.update_transaction(&transaction).await?;
            writer.update_document(&record).await?;
            writer.supersede_document_lines(record.id).await?;
            writer.insert_document_lines(&lines).await?;
            writer.supersede_splits(transaction.id).await?;
            writer.insert_splits(&splits).await
        }
        .await;
        settle(writer, written, record.id).await?;

        info!(
            document_id = %record.id,
            transaction_id = %transaction.id,
            document_type = %record.document_type,
            splits = splits.len(),
            "document updated"
        );
        self.get(record.id).await
    }

    /// Voids a document and its transaction.
    ///
    /// Splits keep their status; balances skip voided transactions.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` for an unknown document and
    /// `DocumentVoided` if it is already voided.
    pub async fn void(
        &self,
        ctx: &PostingContext,
        id: DocumentId,
    ) -> Result<PostedDocument, LedgerError> {
        let mut record = self.load_document(ctx, id).await?;
        if !record.is_active() {
            return Err(LedgerError::DocumentVoided(id));
        }
        let mut transaction = self.load_transaction(&record).await?;

        let now = Utc::now();
        transaction.status = TransactionStatus::Voided;
        transaction.updated_at = now;
        record.status = TransactionStatus::Voided;
        record.updated_at = now;

        let mut writer = self.store.begin().await?;
        let written = async {
            writer.update_transaction(&transaction).await?;
            writer.update_document(&record).await
        }
        .await;
        settle(writer, written, record.id).await?;

        info!(
            document_id = %record.id,
            transaction_id = %transaction.id,
            document_type = %record.document_type,
            "document voided"
        );
        self.get(record.id).await
    }

    /// Applies part of a credit memo to an invoice.
    ///
    /// Writes one cross-reference row and nothing to the ledger.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCredit` when the memo's unapplied balance is
    /// smaller than the request, and reference errors when either document
    /// is missing, voided, of the wrong type or in another building.
    pub async fn apply_credit(
        &self,
        ctx: &PostingContext,
        request: AppliedCreditRequest,
    ) -> Result<AppliedCredit, LedgerError> {
        request.validate()?;
        let credit_memo = self
            .load_typed(ctx, request.credit_memo_id, DocumentType::CreditMemo)
            .await?;
        self.load_typed(ctx, request.invoice_id, DocumentType::Invoice)
            .await?;

        let applied = self.store.applied_credits(credit_memo.id).await?;
        let available = check_availability(&credit_memo, &applied, request.amount)?;

        let row = AppliedCredit {
            id: AppliedCreditId::new(),
            building_id: ctx.building_id,
            credit_memo_id: request.credit_memo_id,
            invoice_id: request.invoice_id,
            amount: request.amount,
            applied_date: request.applied_date,
            status: RecordStatus::Active,
            created_by: ctx.user_id,
            created_at: Utc::now(),
        };

        let mut writer = self.store.begin().await?;
        let written = writer.insert_applied_credit(&row).await;
        settle(writer, written, credit_memo.id).await?;

        info!(
            applied_credit_id = %row.id,
            credit_memo_id = %row.credit_memo_id,
            invoice_id = %row.invoice_id,
            amount = %row.amount,
            remaining = %(available - row.amount),
            "credit applied"
        );
        Ok(row)
    }

    /// Withdraws an applied credit, freeing its amount.
    ///
    /// # Errors
    ///
    /// Returns `AppliedCreditNotFound` if the row does not exist, belongs
    /// to another building or was already withdrawn.
    pub async fn remove_applied_credit(
        &self,
        ctx: &PostingContext,
        id: AppliedCreditId,
    ) -> Result<AppliedCredit, LedgerError> {
        let mut row = self
            .store
            .applied_credit(id)
            .await?
            .filter(|r| r.building_id == ctx.building_id && r.is_active())
            .ok_or(LedgerError::AppliedCreditNotFound(id))?;

        let mut writer = self.store.begin().await?;
        let written = writer.supersede_applied_credit(id).await;
        settle(writer, written, row.credit_memo_id).await?;

        info!(
            applied_credit_id = %id,
            credit_memo_id = %row.credit_memo_id,
            "applied credit removed"
        );
        row.status = RecordStatus::Superseded;
        Ok(row)
    }

    /// Reads a document back with its active lines and splits.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` or `TransactionNotFound` when a row is
    /// missing.
    pub async fn get(&self, id: DocumentId) -> Result<PostedDocument, LedgerError> {
        let document = self
            .store
            .document(id)
            .await?
            .ok_or(LedgerError::DocumentNotFound(id))?;
        let transaction = self.load_transaction(&document).await?;
        let lines = self.store.document_lines(id, RowFilter::ActiveOnly).await?;
        let splits = self
            .store
            .splits(transaction.id, RowFilter::ActiveOnly)
            .await?;
        let totals = totals(&splits);
        Ok(PostedDocument {
            document,
            lines,
            transaction,
            splits,
            totals,
        })
    }

    /// Unapplied balance of a credit memo.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` for an unknown credit memo.
    pub async fn available_credit(
        &self,
        credit_memo_id: DocumentId,
    ) -> Result<Decimal, LedgerError> {
        let credit_memo = self
            .store
            .document(credit_memo_id)
            .await?
            .ok_or(LedgerError::DocumentNotFound(credit_memo_id))?;
        let applied = self.store.applied_credits(credit_memo_id).await?;
        Ok(available_credit(credit_memo.amount, &applied))
    }

    async fn compile(&self, document: &Document) -> Result<CompiledDocument, LedgerError> {
        let resolved = resolve(
            &self.directory,
            &document.account_ids(),
            &document.item_ids(),
        )
        .await?;
        let compiled = document.compile(&resolved, self.policy)?;
        if let Some(drift) = compiled.correction {
            debug!(document_type = %document.document_type(), %drift, "rounding drift absorbed");
        }
        Ok(compiled)
    }

    async fn check_number(
        &self,
        ctx: &PostingContext,
        document: &Document,
        editing: Option<DocumentId>,
    ) -> Result<(), LedgerError> {
        let Some(number) = document.number() else {
            return Ok(());
        };
        let document_type = document.document_type();
        if let Some(existing) = self
            .store
            .document_by_number(ctx.building_id, document_type, number)
            .await?
            && Some(existing.id) != editing
        {
            return Err(LedgerError::DuplicateNumber {
                document_type,
                number: number.to_string(),
            });
        }
        Ok(())
    }

    async fn check_invoice_reference(
        &self,
        ctx: &PostingContext,
        document: &Document,
    ) -> Result<(), LedgerError> {
        if let Some(invoice_id) = document.invoice_id() {
            self.load_typed(ctx, invoice_id, DocumentType::Invoice)
                .await?;
        }
        Ok(())
    }

    /// Loads a document of the context's building.
    async fn load_document(
        &self,
        ctx: &PostingContext,
        id: DocumentId,
    ) -> Result<DocumentRecord, LedgerError> {
        self.store
            .document(id)
            .await?
            .filter(|d| d.building_id == ctx.building_id)
            .ok_or(LedgerError::DocumentNotFound(id))
    }

    /// Loads an active document of the given type.
    async fn load_typed(
        &self,
        ctx: &PostingContext,
        id: DocumentId,
        expected: DocumentType,
    ) -> Result<DocumentRecord, LedgerError> {
        let record = self.load_document(ctx, id).await?;
        if record.document_type != expected {
            return Err(LedgerError::DocumentTypeMismatch {
                document_id: id,
                expected,
                actual: record.document_type,
            });
        }
        if !record.is_active() {
            return Err(LedgerError::DocumentVoided(id));
        }
        Ok(record)
    }

    async fn load_transaction(&self, record: &DocumentRecord) -> Result<Transaction, LedgerError> {
        self.store
            .transaction(record.transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(record.transaction_id))
    }
}

/// Commits on success, rolls back otherwise.
async fn settle<W: LedgerWriter>(
    writer: W,
    written: Result<(), LedgerError>,
    document_id: DocumentId,
) -> Result<(), LedgerError> {
    match written {
        Ok(()) => writer.commit().await.inspect_err(|err| {
            warn!(%document_id, error = %err, "commit failed");
        }),
        Err(err) => {
            warn!(%document_id, error = %err, "write failed, rolling back");
            if let Err(rollback) = writer.rollback().await {
                warn!(%document_id, error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}

fn snapshot(document: &Document) -> Result<serde_json::Value, LedgerError> {
    serde_json::to_value(document)
        .map_err(|e| LedgerError::Storage(format!("failed to serialize document: {e}")))
}

/// Turns compiled output into rows keyed to the document and transaction.
fn materialize(
    record: &DocumentRecord,
    transaction: &Transaction,
    compiled: CompiledDocument,
) -> (Vec<DocumentLine>, Vec<Split>) {
    let now = record.updated_at;
    let lines = compiled
        .lines
        .into_iter()
        .zip(1..)
        .map(|(draft, position)| DocumentLine::from_draft(record.id, position, draft, now))
        .collect();
    let splits = compiled
        .splits
        .iter()
        .zip(1..)
        .map(|(candidate, position)| {
            Split::from_candidate(transaction.id, position, candidate, now)
        })
        .collect();
    (lines, splits)
}
