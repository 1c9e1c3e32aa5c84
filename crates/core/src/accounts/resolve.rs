//! Up-front resolution of every account and item a document references.
//!
//! Compilers are pure; they only see a [`ResolvedAccounts`] snapshot built
//! here before any write is issued, so a missing reference aborts the
//! posting with nothing written.

use std::collections::{BTreeSet, HashMap};

use propledger_shared::types::{AccountId, ItemId};

use super::directory::AccountDirectory;
use super::types::{AccountCategory, AccountInfo, ItemInfo};
use crate::ledger::{LedgerError, NormalSide};

/// An account joined with its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    /// Account data.
    pub info: AccountInfo,
    /// Category of the account's type.
    pub category: AccountCategory,
    /// Whether splits on this account need a party.
    pub is_ar_ap: bool,
}

impl ResolvedAccount {
    /// Side on which the balance grows.
    #[must_use]
    pub fn normal_side(&self) -> NormalSide {
        self.info.normal_side
    }
}

/// Accounts and items resolved for one document.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAccounts {
    accounts: HashMap<AccountId, ResolvedAccount>,
    items: HashMap<ItemId, ItemInfo>,
}

impl ResolvedAccounts {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    pub fn insert_account(&mut self, account: ResolvedAccount) {
        self.accounts.insert(account.info.id, account);
    }

    /// Adds an item.
    pub fn insert_item(&mut self, item: ItemInfo) {
        self.items.insert(item.id, item);
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account was not resolved.
    pub fn account(&self, id: AccountId) -> Result<&ResolvedAccount, LedgerError> {
        self.accounts
            .get(&id)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Looks up an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item was not resolved.
    pub fn item(&self, id: ItemId) -> Result<&ItemInfo, LedgerError> {
        self.items.get(&id).ok_or(LedgerError::ItemNotFound(id))
    }

    /// Returns true if the account is resolved and AR/AP typed.
    #[must_use]
    pub fn is_ar_ap(&self, id: AccountId) -> bool {
        self.accounts.get(&id).is_some_and(|a| a.is_ar_ap)
    }
}

/// Resolves the given accounts and items, plus every account linked to the
/// items.
///
/// # Errors
///
/// Returns the not-found error for the first id that does not resolve, or a
/// storage error from the directory.
pub async fn resolve<D>(
    directory: &D,
    account_ids: &[AccountId],
    item_ids: &[ItemId],
) -> Result<ResolvedAccounts, LedgerError>
where
    D: AccountDirectory + ?Sized,
{
    let mut resolved = ResolvedAccounts::new();
    let mut wanted: BTreeSet<AccountId> = account_ids.iter().copied().collect();

    let item_ids: BTreeSet<ItemId> = item_ids.iter().copied().collect();
    for item_id in item_ids {
        let item = directory
            .item(item_id)
            .await?
            .ok_or(LedgerError::ItemNotFound(item_id))?;
        wanted.extend(item.linked_accounts());
        resolved.insert_item(item);
    }

    for account_id in wanted {
        let info = directory
            .account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let account_type = directory
            .account_type(info.account_type_id)
            .await?
            .ok_or(LedgerError::AccountTypeNotFound(info.account_type_id))?;
        resolved.insert_account(ResolvedAccount {
            info,
            category: account_type.category,
            is_ar_ap: account_type.is_ar_ap,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{ItemType, MemoryDirectory};

    #[tokio::test]
    async fn test_resolve_pulls_in_item_accounts() {
        let dir = MemoryDirectory::new();
        let ar_type = dir.add_account_type("A/R", AccountCategory::Asset, true);
        let income_type = dir.add_account_type("Income", AccountCategory::Income, false);
        let ar = dir.add_account("Accounts Receivable", ar_type);
        let rent = dir.add_account("Rent Income", income_type);
        let item = dir.add_item("Rent", ItemType::Service, rent, None);

        let resolved = resolve(&dir, &[ar], &[item]).await.unwrap();
        assert!(resolved.is_ar_ap(ar));
        assert!(!resolved.is_ar_ap(rent));
        assert_eq!(resolved.account(rent).unwrap().category, AccountCategory::Income);
        assert_eq!(resolved.item(item).unwrap().name, "Rent");
    }

    #[tokio::test]
    async fn test_resolve_fails_on_missing_account() {
        let dir = MemoryDirectory::new();
        let missing = AccountId::new();
        let err = resolve(&dir, &[missing], &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_resolve_fails_on_missing_item() {
        let dir = MemoryDirectory::new();
        let err = resolve(&dir, &[], &[ItemId::new()]).await.unwrap_err();
        assert!(matches!(err, LedgerError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_fails_on_missing_account_type() {
        let dir = MemoryDirectory::new();
        let orphan = dir.add_account("Orphan", propledger_shared::types::AccountTypeId::new());
        let err = resolve(&dir, &[orphan], &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountTypeNotFound(_)));
    }
}
