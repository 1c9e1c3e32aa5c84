//! Conversions between entity models and ledger domain types.

use chrono::Utc;
use sea_orm::{DbErr, Set, SqlErr};

use propledger_core::accounts::{
    AccountCategory, AccountInfo, AccountTypeInfo, ItemInfo, ItemType,
};
use propledger_core::ledger::{
    AppliedCredit, DocumentLine, DocumentRecord, DocumentType, EntryType, LedgerError, NormalSide,
    RecordStatus, Split, Transaction, TransactionStatus,
};
use propledger_shared::types::{
    AccountId, AccountTypeId, AppliedCreditId, BuildingId, DocumentId, DocumentLineId, ItemId,
    PartyId, SplitId, TransactionId, UnitId, UserId,
};

use crate::entities::{
    account_types, accounts, applied_credits, document_lines, documents, items,
    sea_orm_active_enums as db, splits, transactions,
};

/// Maps a database error onto the ledger's storage error.
pub(crate) fn storage(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

/// Maps a write error, turning a unique violation into `DuplicateNumber`.
pub(crate) fn duplicate_or_storage(
    err: DbErr,
    document_type: DocumentType,
    number: Option<&str>,
) -> LedgerError {
    match (err.sql_err(), number) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(number)) => LedgerError::DuplicateNumber {
            document_type,
            number: number.to_string(),
        },
        _ => storage(err),
    }
}

impl From<DocumentType> for db::DocumentType {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Invoice => Self::Invoice,
            DocumentType::Check => Self::Check,
            DocumentType::CreditMemo => Self::CreditMemo,
            DocumentType::Journal => Self::Journal,
            DocumentType::SalesReceipt => Self::SalesReceipt,
            DocumentType::InvoicePayment => Self::InvoicePayment,
            DocumentType::AppliedDiscount => Self::AppliedDiscount,
        }
    }
}

impl From<db::DocumentType> for DocumentType {
    fn from(value: db::DocumentType) -> Self {
        match value {
            db::DocumentType::Invoice => Self::Invoice,
            db::DocumentType::Check => Self::Check,
            db::DocumentType::CreditMemo => Self::CreditMemo,
            db::DocumentType::Journal => Self::Journal,
            db::DocumentType::SalesReceipt => Self::SalesReceipt,
            db::DocumentType::InvoicePayment => Self::InvoicePayment,
            db::DocumentType::AppliedDiscount => Self::AppliedDiscount,
        }
    }
}

impl From<TransactionStatus> for db::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Active => Self::Active,
            TransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<db::TransactionStatus> for TransactionStatus {
    fn from(value: db::TransactionStatus) -> Self {
        match value {
            db::TransactionStatus::Active => Self::Active,
            db::TransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<RecordStatus> for db::RecordStatus {
    fn from(value: RecordStatus) -> Self {
        match value {
            RecordStatus::Active => Self::Active,
            RecordStatus::Superseded => Self::Superseded,
        }
    }
}

impl From<db::RecordStatus> for RecordStatus {
    fn from(value: db::RecordStatus) -> Self {
        match value {
            db::RecordStatus::Active => Self::Active,
            db::RecordStatus::Superseded => Self::Superseded,
        }
    }
}

impl From<EntryType> for db::EntryType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

impl From<db::EntryType> for EntryType {
    fn from(value: db::EntryType) -> Self {
        match value {
            db::EntryType::Debit => Self::Debit,
            db::EntryType::Credit => Self::Credit,
        }
    }
}

impl From<NormalSide> for db::EntryType {
    fn from(value: NormalSide) -> Self {
        match value {
            NormalSide::Debit => Self::Debit,
            NormalSide::Credit => Self::Credit,
        }
    }
}

impl From<db::EntryType> for NormalSide {
    fn from(value: db::EntryType) -> Self {
        match value {
            db::EntryType::Debit => Self::Debit,
            db::EntryType::Credit => Self::Credit,
        }
    }
}

impl From<AccountCategory> for db::AccountCategory {
    fn from(value: AccountCategory) -> Self {
        match value {
            AccountCategory::Asset => Self::Asset,
            AccountCategory::Liability => Self::Liability,
            AccountCategory::Equity => Self::Equity,
            AccountCategory::Income => Self::Income,
            AccountCategory::Expense => Self::Expense,
        }
    }
}

impl From<db::AccountCategory> for AccountCategory {
    fn from(value: db::AccountCategory) -> Self {
        match value {
            db::AccountCategory::Asset => Self::Asset,
            db::AccountCategory::Liability => Self::Liability,
            db::AccountCategory::Equity => Self::Equity,
            db::AccountCategory::Income => Self::Income,
            db::AccountCategory::Expense => Self::Expense,
        }
    }
}

impl From<ItemType> for db::ItemType {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Inventory => Self::Inventory,
            ItemType::NonInventory => Self::NonInventory,
            ItemType::Service => Self::Service,
            ItemType::Discount => Self::Discount,
            ItemType::Payment => Self::Payment,
        }
    }
}

impl From<db::ItemType> for ItemType {
    fn from(value: db::ItemType) -> Self {
        match value {
            db::ItemType::Inventory => Self::Inventory,
            db::ItemType::NonInventory => Self::NonInventory,
            db::ItemType::Service => Self::Service,
            db::ItemType::Discount => Self::Discount,
            db::ItemType::Payment => Self::Payment,
        }
    }
}

// ----------------------------------------------------------------------------
// Models to domain
// ----------------------------------------------------------------------------

pub(crate) fn transaction_from_model(model: transactions::Model) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        document_type: model.document_type.into(),
        transaction_date: model.transaction_date,
        memo: model.memo,
        reference: model.reference,
        status: model.status.into(),
        building_id: BuildingId::from_uuid(model.building_id),
        created_by: UserId::from_uuid(model.created_by),
        unit_id: model.unit_id.map(UnitId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn split_from_model(model: splits::Model) -> Split {
    Split {
        id: SplitId::from_uuid(model.id),
        transaction_id: TransactionId::from_uuid(model.transaction_id),
        position: model.position,
        account_id: AccountId::from_uuid(model.account_id),
        party_id: model.party_id.map(PartyId::from_uuid),
        unit_id: model.unit_id.map(UnitId::from_uuid),
        debit: model.debit,
        credit: model.credit,
        memo: model.memo,
        status: model.status.into(),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn document_from_model(model: documents::Model) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId::from_uuid(model.id),
        document_type: model.document_type.into(),
        building_id: BuildingId::from_uuid(model.building_id),
        transaction_id: TransactionId::from_uuid(model.transaction_id),
        number: model.number,
        party_id: model.party_id.map(PartyId::from_uuid),
        unit_id: model.unit_id.map(UnitId::from_uuid),
        document_date: model.document_date,
        amount: model.amount,
        invoice_id: model.invoice_id.map(DocumentId::from_uuid),
        payload: model.payload,
        status: model.status.into(),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn line_from_model(model: document_lines::Model) -> DocumentLine {
    DocumentLine {
        id: DocumentLineId::from_uuid(model.id),
        document_id: DocumentId::from_uuid(model.document_id),
        position: model.position,
        account_id: model.account_id.map(AccountId::from_uuid),
        item_id: model.item_id.map(ItemId::from_uuid),
        description: model.description,
        quantity: model.quantity,
        rate: model.rate,
        amount: model.amount,
        entry_type: model.entry_type.map(Into::into),
        party_id: model.party_id.map(PartyId::from_uuid),
        unit_id: model.unit_id.map(UnitId::from_uuid),
        status: model.status.into(),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn applied_credit_from_model(model: applied_credits::Model) -> AppliedCredit {
    AppliedCredit {
        id: AppliedCreditId::from_uuid(model.id),
        building_id: BuildingId::from_uuid(model.building_id),
        credit_memo_id: DocumentId::from_uuid(model.credit_memo_id),
        invoice_id: DocumentId::from_uuid(model.invoice_id),
        amount: model.amount,
        applied_date: model.applied_date,
        status: model.status.into(),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn account_from_model(model: accounts::Model) -> AccountInfo {
    AccountInfo {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        account_type_id: AccountTypeId::from_uuid(model.account_type_id),
        normal_side: model.normal_side.into(),
    }
}

pub(crate) fn account_type_from_model(model: account_types::Model) -> AccountTypeInfo {
    AccountTypeInfo {
        id: AccountTypeId::from_uuid(model.id),
        name: model.name,
        category: model.category.into(),
        is_ar_ap: model.is_ar_ap,
    }
}

pub(crate) fn item_from_model(model: items::Model) -> ItemInfo {
    ItemInfo {
        id: ItemId::from_uuid(model.id),
        name: model.name,
        item_type: model.item_type.into(),
        asset_account_id: model.asset_account_id.map(AccountId::from_uuid),
        income_account_id: model.income_account_id.map(AccountId::from_uuid),
        cogs_account_id: model.cogs_account_id.map(AccountId::from_uuid),
        expense_account_id: model.expense_account_id.map(AccountId::from_uuid),
        rate: model.rate,
    }
}

// ----------------------------------------------------------------------------
// Domain to active models
// ----------------------------------------------------------------------------

pub(crate) fn transaction_active(tx: &Transaction) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        document_type: Set(tx.document_type.into()),
        transaction_date: Set(tx.transaction_date),
        memo: Set(tx.memo.clone()),
        reference: Set(tx.reference.clone()),
        status: Set(tx.status.into()),
        building_id: Set(tx.building_id.into_inner()),
        created_by: Set(tx.created_by.into_inner()),
        unit_id: Set(tx.unit_id.map(UnitId::into_inner)),
        created_at: Set(tx.created_at.into()),
        updated_at: Set(tx.updated_at.into()),
    }
}

pub(crate) fn split_active(split: &Split) -> splits::ActiveModel {
    splits::ActiveModel {
        id: Set(split.id.into_inner()),
        transaction_id: Set(split.transaction_id.into_inner()),
        position: Set(split.position),
        account_id: Set(split.account_id.into_inner()),
        party_id: Set(split.party_id.map(PartyId::into_inner)),
        unit_id: Set(split.unit_id.map(UnitId::into_inner)),
        debit: Set(split.debit),
        credit: Set(split.credit),
        memo: Set(split.memo.clone()),
        status: Set(split.status.into()),
        created_at: Set(split.created_at.into()),
    }
}

pub(crate) fn document_active(doc: &DocumentRecord) -> documents::ActiveModel {
    documents::ActiveModel {
        id: Set(doc.id.into_inner()),
        document_type: Set(doc.document_type.into()),
        building_id: Set(doc.building_id.into_inner()),
        transaction_id: Set(doc.transaction_id.into_inner()),
        number: Set(doc.number.clone()),
        party_id: Set(doc.party_id.map(PartyId::into_inner)),
        unit_id: Set(doc.unit_id.map(UnitId::into_inner)),
        document_date: Set(doc.document_date),
        amount: Set(doc.amount),
        invoice_id: Set(doc.invoice_id.map(DocumentId::into_inner)),
        payload: Set(doc.payload.clone()),
        status: Set(doc.status.into()),
        created_by: Set(doc.created_by.into_inner()),
        created_at: Set(doc.created_at.into()),
        updated_at: Set(doc.updated_at.into()),
    }
}

pub(crate) fn line_active(line: &DocumentLine) -> document_lines::ActiveModel {
    document_lines::ActiveModel {
        id: Set(line.id.into_inner()),
        document_id: Set(line.document_id.into_inner()),
        position: Set(line.position),
        account_id: Set(line.account_id.map(AccountId::into_inner)),
        item_id: Set(line.item_id.map(ItemId::into_inner)),
        description: Set(line.description.clone()),
        quantity: Set(line.quantity),
        rate: Set(line.rate.clone()),
        amount: Set(line.amount),
        entry_type: Set(line.entry_type.map(Into::into)),
        party_id: Set(line.party_id.map(PartyId::into_inner)),
        unit_id: Set(line.unit_id.map(UnitId::into_inner)),
        status: Set(line.status.into()),
        created_at: Set(line.created_at.into()),
    }
}

pub(crate) fn applied_credit_active(row: &AppliedCredit) -> applied_credits::ActiveModel {
    applied_credits::ActiveModel {
        id: Set(row.id.into_inner()),
        building_id: Set(row.building_id.into_inner()),
        credit_memo_id: Set(row.credit_memo_id.into_inner()),
        invoice_id: Set(row.invoice_id.into_inner()),
        amount: Set(row.amount),
        applied_date: Set(row.applied_date),
        status: Set(row.status.into()),
        created_by: Set(row.created_by.into_inner()),
        created_at: Set(row.created_at.into()),
    }
}
