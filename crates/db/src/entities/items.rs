//! `SeaORM` Entity for items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ItemType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub item_type: ItemType,
    pub asset_account_id: Option<Uuid>,
    pub income_account_id: Option<Uuid>,
    pub cogs_account_id: Option<Uuid>,
    pub expense_account_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub rate: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
