//! Shared chart of accounts for unit tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use propledger_shared::types::{AccountId, ItemId, PartyId};

use crate::accounts::{AccountCategory, ItemType, MemoryDirectory, ResolvedAccounts};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A small property-management chart.
pub(crate) struct Chart {
    pub directory: Arc<MemoryDirectory>,
    pub cash: AccountId,
    pub ar: AccountId,
    pub ap: AccountId,
    pub deposits: AccountId,
    pub equity: AccountId,
    pub rent_income: AccountId,
    pub fee_income: AccountId,
    pub discounts: AccountId,
    pub repairs: AccountId,
    pub utilities: AccountId,
    /// Service, rent income, no default rate.
    pub rent: ItemId,
    /// Service, rent income, shares the account with `rent`.
    pub parking: ItemId,
    /// Service, fee income, default rate 25.00.
    pub late_fee: ItemId,
    /// Discount, discounts account.
    pub discount: ItemId,
    /// Payment, cash account.
    pub payment: ItemId,
    /// Inventory, cannot be invoiced.
    pub supplies: ItemId,
    pub customer: PartyId,
    pub vendor: PartyId,
}

impl Chart {
    pub fn new() -> Self {
        let directory = MemoryDirectory::new();
        let bank = directory.add_account_type("Bank", AccountCategory::Asset, false);
        let receivable =
            directory.add_account_type("Accounts Receivable", AccountCategory::Asset, true);
        let payable =
            directory.add_account_type("Accounts Payable", AccountCategory::Liability, true);
        let liability =
            directory.add_account_type("Other Liability", AccountCategory::Liability, false);
        let equity = directory.add_account_type("Equity", AccountCategory::Equity, false);
        let income = directory.add_account_type("Income", AccountCategory::Income, false);
        let expense = directory.add_account_type("Expense", AccountCategory::Expense, false);

        let cash = directory.add_account("Operating Cash", bank);
        let ar = directory.add_account("Accounts Receivable", receivable);
        let ap = directory.add_account("Accounts Payable", payable);
        let deposits = directory.add_account("Tenant Deposits", liability);
        let owner_equity = directory.add_account("Owner Equity", equity);
        let rent_income = directory.add_account("Rent Income", income);
        let fee_income = directory.add_account("Fee Income", income);
        let discounts = directory.add_account("Discounts Given", income);
        let repairs = directory.add_account("Repairs", expense);
        let utilities = directory.add_account("Utilities", expense);

        let rent = directory.add_item("Rent", ItemType::Service, rent_income, None);
        let parking = directory.add_item("Parking", ItemType::Service, rent_income, None);
        let late_fee =
            directory.add_item("Late Fee", ItemType::Service, fee_income, Some(dec!(25.00)));
        let discount = directory.add_item("Loyalty Discount", ItemType::Discount, discounts, None);
        let payment = directory.add_item("Prepayment", ItemType::Payment, cash, None);
        let supplies = directory.add_item("Supplies", ItemType::Inventory, repairs, None);

        Self {
            directory: Arc::new(directory),
            cash,
            ar,
            ap,
            deposits,
            equity: owner_equity,
            rent_income,
            fee_income,
            discounts,
            repairs,
            utilities,
            rent,
            parking,
            late_fee,
            discount,
            payment,
            supplies,
            customer: PartyId::new(),
            vendor: PartyId::new(),
        }
    }

    pub fn resolved(&self) -> ResolvedAccounts {
        self.directory.resolve_all()
    }
}
