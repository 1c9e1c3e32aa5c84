//! Chart of accounts repository.
//!
//! [`SeaAccountDirectory`] is the read side the posting engine resolves
//! accounts and items through. The `create_*` methods maintain the
//! reference tables and are used by the seeder and integration tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tracing::info;

use propledger_core::accounts::{
    AccountCategory, AccountDirectory, AccountInfo, AccountTypeInfo, ItemInfo, ItemType,
};
use propledger_core::ledger::{LedgerError, NormalSide};
use propledger_shared::types::{AccountId, AccountTypeId, ItemId};

use super::convert::{account_from_model, account_type_from_model, item_from_model, storage};
use crate::entities::{account_types, accounts, items};

/// Account directory backed by the reference tables.
#[derive(Debug, Clone)]
pub struct SeaAccountDirectory {
    db: DatabaseConnection,
}

impl SeaAccountDirectory {
    /// Creates a new directory.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account type.
    pub async fn create_account_type(
        &self,
        name: &str,
        category: AccountCategory,
        is_ar_ap: bool,
    ) -> Result<AccountTypeInfo, DbErr> {
        let model = account_types::ActiveModel {
            id: Set(AccountTypeId::new().into_inner()),
            name: Set(name.to_string()),
            category: Set(category.into()),
            is_ar_ap: Set(is_ar_ap),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(account_type = %model.name, category = %category, "Created account type");
        Ok(account_type_from_model(model))
    }

    /// Creates an account. The normal side defaults to the category's.
    pub async fn create_account(
        &self,
        name: &str,
        account_type: &AccountTypeInfo,
        normal_side: Option<NormalSide>,
    ) -> Result<AccountInfo, DbErr> {
        let side = normal_side.unwrap_or_else(|| account_type.category.normal_side());
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            name: Set(name.to_string()),
            account_type_id: Set(account_type.id.into_inner()),
            normal_side: Set(side.into()),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        Ok(account_from_model(model))
    }

    /// Creates an item linked to the account its type posts to.
    pub async fn create_item(
        &self,
        name: &str,
        item_type: ItemType,
        account_id: AccountId,
        rate: Option<Decimal>,
    ) -> Result<ItemInfo, DbErr> {
        let account = Some(account_id.into_inner());
        let (asset, income, expense) = match item_type {
            ItemType::Payment => (account, None, None),
            ItemType::Service | ItemType::Discount => (None, account, None),
            ItemType::Inventory | ItemType::NonInventory => (None, None, account),
        };
        let model = items::ActiveModel {
            id: Set(ItemId::new().into_inner()),
            name: Set(name.to_string()),
            item_type: Set(item_type.into()),
            asset_account_id: Set(asset),
            income_account_id: Set(income),
            cogs_account_id: Set(None),
            expense_account_id: Set(expense),
            rate: Set(rate),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        Ok(item_from_model(model))
    }
}

#[async_trait]
impl AccountDirectory for SeaAccountDirectory {
    async fn account(&self, id: AccountId) -> Result<Option<AccountInfo>, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(account_from_model))
    }

    async fn account_type(
        &self,
        id: AccountTypeId,
    ) -> Result<Option<AccountTypeInfo>, LedgerError> {
        let model = account_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(account_type_from_model))
    }

    async fn item(&self, id: ItemId) -> Result<Option<ItemInfo>, LedgerError> {
        let model = items::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(item_from_model))
    }

    async fn accounts(&self) -> Result<Vec<AccountInfo>, LedgerError> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(account_from_model).collect())
    }
}
