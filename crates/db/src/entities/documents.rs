//! `SeaORM` Entity for documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentType, TransactionStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_type: DocumentType,
    pub building_id: Uuid,
    #[sea_orm(unique)]
    pub transaction_id: Uuid,
    pub number: Option<String>,
    pub party_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub document_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub invoice_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,
    pub status: TransactionStatus,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
    #[sea_orm(has_many = "super::document_lines::Entity")]
    DocumentLines,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::document_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
