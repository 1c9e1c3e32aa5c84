//! Report assembly from postings and account balances.
//!
//! Everything here is pure; [`BalanceEngine`](super::BalanceEngine) feeds it
//! from the store.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use propledger_shared::types::AccountId;

use super::types::{
    AccountBalance, BalanceSheetReport, BalanceSheetSection, LedgerRow, ReportScope,
    TrialBalanceReport, TrialBalanceTotals,
};
use crate::accounts::{AccountCategory, ResolvedAccount, ResolvedAccounts};
use crate::ledger::{LedgerError, NormalSide, RunningBalance};
use crate::posting::Posting;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Sums the debit and credit sides of some postings.
    #[must_use]
    pub fn sum_sides<'a>(postings: impl IntoIterator<Item = &'a Posting>) -> (Decimal, Decimal) {
        postings
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), p| {
                (debit + p.split.debit_amount(), credit + p.split.credit_amount())
            })
    }

    /// Debit and credit totals per account.
    #[must_use]
    pub fn sums_by_account(postings: &[Posting]) -> HashMap<AccountId, (Decimal, Decimal)> {
        let mut sums: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
        for posting in postings {
            let entry = sums
                .entry(posting.split.account_id)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += posting.split.debit_amount();
            entry.1 += posting.split.credit_amount();
        }
        sums
    }

    /// Builds an account's balance from its debit and credit totals.
    #[must_use]
    pub fn account_balance(
        account: &ResolvedAccount,
        total_debit: Decimal,
        total_credit: Decimal,
    ) -> AccountBalance {
        AccountBalance {
            account_id: account.info.id,
            name: account.info.name.clone(),
            category: account.category,
            normal_side: account.normal_side(),
            total_debit,
            total_credit,
            balance: account.normal_side().balance_change(total_debit, total_credit),
        }
    }

    /// Generates a trial balance report from account balances.
    ///
    /// The trial balance verifies that total debits equal total credits.
    #[must_use]
    pub fn generate_trial_balance(
        as_of: NaiveDate,
        scope: ReportScope,
        accounts: Vec<AccountBalance>,
    ) -> TrialBalanceReport {
        let total_debit: Decimal = accounts.iter().map(|a| a.total_debit).sum();
        let total_credit: Decimal = accounts.iter().map(|a| a.total_credit).sum();

        TrialBalanceReport {
            as_of,
            building_id: scope.building_id,
            accounts,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        }
    }

    /// Generates a balance sheet report from account balances.
    ///
    /// Section totals use each category's conventional side. Income and
    /// expense accounts are folded into equity as net income.
    #[must_use]
    pub fn generate_balance_sheet(
        as_of: NaiveDate,
        scope: ReportScope,
        accounts: Vec<AccountBalance>,
    ) -> BalanceSheetReport {
        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();
        let mut net_income = Decimal::ZERO;

        for account in accounts {
            match account.category {
                AccountCategory::Asset => Self::add_to_section(&mut assets, account),
                AccountCategory::Liability => Self::add_to_section(&mut liabilities, account),
                AccountCategory::Equity => Self::add_to_section(&mut equity, account),
                AccountCategory::Income | AccountCategory::Expense => {
                    let change = NormalSide::Credit
                        .balance_change(account.total_debit, account.total_credit);
                    net_income += change;
                    equity.accounts.push(account);
                }
            }
        }
        equity.total += net_income;

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            building_id: scope.building_id,
            assets,
            liabilities,
            equity,
            net_income,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    /// Emits one row per posting with its account's running balance.
    ///
    /// Each account's running balance starts at its entry in `openings`,
    /// or zero.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for a posting on an account missing from
    /// `chart`.
    pub fn running_rows(
        postings: &[Posting],
        chart: &ResolvedAccounts,
        openings: &HashMap<AccountId, Decimal>,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        let mut running: HashMap<AccountId, RunningBalance> = HashMap::new();
        let mut rows = Vec::with_capacity(postings.len());

        for posting in postings {
            let split = &posting.split;
            let account = chart.account(split.account_id)?;
            let state = running.entry(split.account_id).or_insert_with(|| {
                RunningBalance::opening(
                    openings.get(&split.account_id).copied().unwrap_or_default(),
                )
            });
            *state = state.next(account.normal_side().split_change(split));

            rows.push(LedgerRow {
                split_id: split.id,
                transaction_id: split.transaction_id,
                transaction_date: posting.transaction_date,
                document_type: posting.document_type,
                account_id: split.account_id,
                account_name: account.info.name.clone(),
                memo: split.memo.clone().or_else(|| posting.memo.clone()),
                reference: posting.reference.clone(),
                party_id: split.party_id,
                unit_id: split.unit_id,
                debit: split.debit_amount(),
                credit: split.credit_amount(),
                running: *state,
            });
        }
        Ok(rows)
    }

    fn add_to_section(section: &mut BalanceSheetSection, account: AccountBalance) {
        section.total += account
            .category
            .normal_side()
            .balance_change(account.total_debit, account.total_credit);
        section.accounts.push(account);
    }
}
