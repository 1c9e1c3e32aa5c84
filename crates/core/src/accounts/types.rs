//! Reference data the ledger reads but never writes.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{AccountId, AccountTypeId, ItemId};

use crate::ledger::NormalSide;

/// Coarse account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Cash, bank, receivables.
    Asset,
    /// Payables, deposits held.
    Liability,
    /// Owner's equity.
    Equity,
    /// Rent and service income.
    Income,
    /// Operating expenses.
    Expense,
}

impl AccountCategory {
    /// Returns the conventional normal side for the category.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalSide::Credit,
        }
    }

    /// Returns the stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account category: {s}")),
        }
    }
}

/// Account type: category plus the AR/AP flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTypeInfo {
    /// Account type id.
    pub id: AccountTypeId,
    /// Display name, e.g. "Accounts Receivable".
    pub name: String,
    /// Coarse category.
    pub category: AccountCategory,
    /// Whether every split on accounts of this type needs a party.
    pub is_ar_ap: bool,
}

/// Account as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type_id: AccountTypeId,
    /// Side on which the balance grows.
    pub normal_side: NormalSide,
}

/// Item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    /// Stocked goods.
    Inventory,
    /// Unstocked goods.
    NonInventory,
    /// Billable service, credited to income.
    Service,
    /// Discount line, debited to income.
    Discount,
    /// Payment line, debited to an asset.
    Payment,
}

impl ItemType {
    /// Returns the stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::NonInventory => "non-inventory",
            Self::Service => "service",
            Self::Discount => "discount",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inventory" => Ok(Self::Inventory),
            "non-inventory" => Ok(Self::NonInventory),
            "service" => Ok(Self::Service),
            "discount" => Ok(Self::Discount),
            "payment" => Ok(Self::Payment),
            _ => Err(format!("Unknown item type: {s}")),
        }
    }
}

/// Item with its linked accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Item type.
    pub item_type: ItemType,
    /// Linked asset account (payments).
    pub asset_account_id: Option<AccountId>,
    /// Linked income account (services, discounts).
    pub income_account_id: Option<AccountId>,
    /// Linked cost-of-goods account.
    pub cogs_account_id: Option<AccountId>,
    /// Linked expense account.
    pub expense_account_id: Option<AccountId>,
    /// Rate used when a line leaves it blank.
    pub rate: Option<Decimal>,
}

impl ItemInfo {
    /// The account an invoice or sales receipt line posts to.
    #[must_use]
    pub fn posting_account(&self) -> Option<AccountId> {
        match self.item_type {
            ItemType::Service | ItemType::Discount => self.income_account_id,
            ItemType::Payment => self.asset_account_id,
            ItemType::Inventory | ItemType::NonInventory => None,
        }
    }

    /// Every linked account id.
    pub fn linked_accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        [
            self.asset_account_id,
            self.income_account_id,
            self.cogs_account_id,
            self.expense_account_id,
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_normal_side() {
        assert_eq!(AccountCategory::Asset.normal_side(), NormalSide::Debit);
        assert_eq!(AccountCategory::Expense.normal_side(), NormalSide::Debit);
        assert_eq!(AccountCategory::Liability.normal_side(), NormalSide::Credit);
        assert_eq!(AccountCategory::Equity.normal_side(), NormalSide::Credit);
        assert_eq!(AccountCategory::Income.normal_side(), NormalSide::Credit);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Revenue".parse::<AccountCategory>(), Ok(AccountCategory::Income));
        assert_eq!("ASSET".parse::<AccountCategory>(), Ok(AccountCategory::Asset));
        assert!("contra".parse::<AccountCategory>().is_err());
    }

    #[test]
    fn test_item_posting_account() {
        let income = AccountId::new();
        let asset = AccountId::new();
        let mut item = ItemInfo {
            id: ItemId::new(),
            name: "Rent".into(),
            item_type: ItemType::Service,
            asset_account_id: Some(asset),
            income_account_id: Some(income),
            cogs_account_id: None,
            expense_account_id: None,
            rate: None,
        };
        assert_eq!(item.posting_account(), Some(income));

        item.item_type = ItemType::Payment;
        assert_eq!(item.posting_account(), Some(asset));

        item.item_type = ItemType::Inventory;
        assert_eq!(item.posting_account(), None);
        assert_eq!(item.linked_accounts().count(), 2);
    }

    #[test]
    fn test_item_type_round_trip() {
        for t in [
            ItemType::Inventory,
            ItemType::NonInventory,
            ItemType::Service,
            ItemType::Discount,
            ItemType::Payment,
        ] {
            assert_eq!(t.as_str().parse::<ItemType>(), Ok(t));
        }
    }
}
