//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{
    AccountId, BuildingId, PartyId, SplitId, TransactionId, UnitId,
};

use crate::accounts::AccountCategory;
use crate::ledger::{DocumentType, NormalSide, RunningBalance};

/// Which part of the ledger a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportScope {
    /// Restrict to one building; `None` covers every building.
    pub building_id: Option<BuildingId>,
}

impl ReportScope {
    /// Every building.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// One building.
    #[must_use]
    pub fn building(building_id: BuildingId) -> Self {
        Self {
            building_id: Some(building_id),
        }
    }
}

/// Account balance for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Account category.
    pub category: AccountCategory,
    /// Side the balance grows on.
    pub normal_side: NormalSide,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Signed balance by the account's normal side.
    pub balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Building the report covers.
    pub building_id: Option<BuildingId>,
    /// Account balances, by account name.
    pub accounts: Vec<AccountBalance>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Balance sheet section (assets, liabilities, equity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<AccountBalance>,
}

/// Balance sheet report.
///
/// There is no income statement, so income and expense accounts are listed
/// under equity and their net is part of the equity total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Building the report covers.
    pub building_id: Option<BuildingId>,
    /// Assets section.
    pub assets: BalanceSheetSection,
    /// Liabilities section.
    pub liabilities: BalanceSheetSection,
    /// Equity section, including income and expense accounts.
    pub equity: BalanceSheetSection,
    /// Income minus expenses, already included in `total_equity`.
    pub net_income: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// One split with the balance it leaves its account at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Split ID.
    pub split_id: SplitId,
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document that posted the transaction.
    pub document_type: DocumentType,
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub account_name: String,
    /// Split memo, else the transaction memo.
    pub memo: Option<String>,
    /// Transaction reference.
    pub reference: Option<String>,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Unit.
    pub unit_id: Option<UnitId>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance.
    pub running: RunningBalance,
}

/// Running-balance ledger for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerReport {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Side the balance grows on.
    pub normal_side: NormalSide,
    /// Period start date.
    pub from: NaiveDate,
    /// Period end date.
    pub to: NaiveDate,
    /// Balance before `from`.
    pub opening_balance: Decimal,
    /// One row per split in the period.
    pub rows: Vec<LedgerRow>,
    /// Total debit in the period.
    pub total_debit: Decimal,
    /// Total credit in the period.
    pub total_credit: Decimal,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

/// Every split in a period, each with its account's running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetailReport {
    /// Period start date.
    pub from: NaiveDate,
    /// Period end date.
    pub to: NaiveDate,
    /// Building the report covers.
    pub building_id: Option<BuildingId>,
    /// Rows in posting order.
    pub rows: Vec<LedgerRow>,
    /// Total debit in the period.
    pub total_debit: Decimal,
    /// Total credit in the period.
    pub total_credit: Decimal,
}
