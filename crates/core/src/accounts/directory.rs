//! Account directory trait and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use propledger_shared::types::{AccountId, AccountTypeId, ItemId};

use super::resolve::{ResolvedAccount, ResolvedAccounts};
use super::types::{AccountCategory, AccountInfo, AccountTypeInfo, ItemInfo, ItemType};
use crate::ledger::{LedgerError, NormalSide};

/// Read-only view over accounts, account types and items.
///
/// A missing id is `Ok(None)`; errors are reserved for the backing store.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Fetches an account.
    async fn account(&self, id: AccountId) -> Result<Option<AccountInfo>, LedgerError>;

    /// Fetches an account type.
    async fn account_type(&self, id: AccountTypeId)
    -> Result<Option<AccountTypeInfo>, LedgerError>;

    /// Fetches an item with its linked accounts.
    async fn item(&self, id: ItemId) -> Result<Option<ItemInfo>, LedgerError>;

    /// Lists every account.
    async fn accounts(&self) -> Result<Vec<AccountInfo>, LedgerError>;
}

#[derive(Debug, Default)]
struct DirectoryState {
    accounts: HashMap<AccountId, AccountInfo>,
    account_types: HashMap<AccountTypeId, AccountTypeInfo>,
    items: HashMap<ItemId, ItemInfo>,
}

/// In-memory directory used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account type and returns its id.
    pub fn add_account_type(
        &self,
        name: &str,
        category: AccountCategory,
        is_ar_ap: bool,
    ) -> AccountTypeId {
        let info = AccountTypeInfo {
            id: AccountTypeId::new(),
            name: name.to_string(),
            category,
            is_ar_ap,
        };
        let id = info.id;
        self.write().account_types.insert(id, info);
        id
    }

    /// Registers an account using its type's conventional normal side.
    ///
    /// An unknown type id falls back to a debit-natured account.
    pub fn add_account(&self, name: &str, account_type_id: AccountTypeId) -> AccountId {
        let mut state = self.write();
        let normal_side = state
            .account_types
            .get(&account_type_id)
            .map_or(NormalSide::Debit, |t| t.category.normal_side());
        let info = AccountInfo {
            id: AccountId::new(),
            name: name.to_string(),
            account_type_id,
            normal_side,
        };
        let id = info.id;
        state.accounts.insert(id, info);
        id
    }

    /// Registers an item linked to the account its type posts to.
    pub fn add_item(
        &self,
        name: &str,
        item_type: ItemType,
        account_id: AccountId,
        rate: Option<Decimal>,
    ) -> ItemId {
        let (asset_account_id, income_account_id, expense_account_id) = match item_type {
            ItemType::Payment => (Some(account_id), None, None),
            ItemType::Service | ItemType::Discount => (None, Some(account_id), None),
            ItemType::Inventory | ItemType::NonInventory => (None, None, Some(account_id)),
        };
        let info = ItemInfo {
            id: ItemId::new(),
            name: name.to_string(),
            item_type,
            asset_account_id,
            income_account_id,
            cogs_account_id: None,
            expense_account_id,
            rate,
        };
        let id = info.id;
        self.write().items.insert(id, info);
        id
    }

    /// Inserts or replaces an item as given.
    pub fn put_item(&self, item: ItemInfo) {
        self.write().items.insert(item.id, item);
    }

    /// Resolves every registered account and item without going through
    /// the async trait.
    ///
    /// Accounts whose type is unknown are left out.
    #[must_use]
    pub fn resolve_all(&self) -> ResolvedAccounts {
        let state = self.read();
        let mut resolved = ResolvedAccounts::new();
        for info in state.accounts.values() {
            if let Some(account_type) = state.account_types.get(&info.account_type_id) {
                resolved.insert_account(ResolvedAccount {
                    info: info.clone(),
                    category: account_type.category,
                    is_ar_ap: account_type.is_ar_ap,
                });
            }
        }
        for item in state.items.values() {
            resolved.insert_item(item.clone());
        }
        resolved
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn account(&self, id: AccountId) -> Result<Option<AccountInfo>, LedgerError> {
        Ok(self.read().accounts.get(&id).cloned())
    }

    async fn account_type(
        &self,
        id: AccountTypeId,
    ) -> Result<Option<AccountTypeInfo>, LedgerError> {
        Ok(self.read().account_types.get(&id).cloned())
    }

    async fn item(&self, id: ItemId) -> Result<Option<ItemInfo>, LedgerError> {
        Ok(self.read().items.get(&id).cloned())
    }

    async fn accounts(&self) -> Result<Vec<AccountInfo>, LedgerError> {
        let mut accounts: Vec<AccountInfo> = self.read().accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }
}

#[async_trait]
impl<T: AccountDirectory + ?Sized> AccountDirectory for Arc<T> {
    async fn account(&self, id: AccountId) -> Result<Option<AccountInfo>, LedgerError> {
        (**self).account(id).await
    }

    async fn account_type(
        &self,
        id: AccountTypeId,
    ) -> Result<Option<AccountTypeInfo>, LedgerError> {
        (**self).account_type(id).await
    }

    async fn item(&self, id: ItemId) -> Result<Option<ItemInfo>, LedgerError> {
        (**self).item(id).await
    }

    async fn accounts(&self) -> Result<Vec<AccountInfo>, LedgerError> {
        (**self).accounts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_directory_lookups() {
        let dir = MemoryDirectory::new();
        let ar = dir.add_account_type("Accounts Receivable", AccountCategory::Asset, true);
        let income = dir.add_account_type("Income", AccountCategory::Income, false);
        let receivable = dir.add_account("A/R", ar);
        let rent = dir.add_account("Rent Income", income);
        let item = dir.add_item("Rent", ItemType::Service, rent, None);

        let account = dir.account(receivable).await.unwrap().unwrap();
        assert_eq!(account.normal_side, NormalSide::Debit);
        assert!(dir.account_type(ar).await.unwrap().unwrap().is_ar_ap);
        assert_eq!(
            dir.account(rent).await.unwrap().unwrap().normal_side,
            NormalSide::Credit
        );
        assert_eq!(
            dir.item(item).await.unwrap().unwrap().income_account_id,
            Some(rent)
        );
        assert!(dir.account(AccountId::new()).await.unwrap().is_none());
        assert_eq!(dir.accounts().await.unwrap().len(), 2);
    }
}
