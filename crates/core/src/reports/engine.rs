//! Balance engine: balances and reports over committed postings.
//!
//! Only active splits of active transactions count. Every figure is a pure
//! function of the committed state, so repeating a call with no writes in
//! between gives the same result.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use propledger_shared::types::AccountId;

use super::service::ReportService;
use super::types::{
    AccountBalance, AccountLedgerReport, BalanceSheetReport, ReportScope,
    TransactionDetailReport, TrialBalanceReport,
};
use crate::accounts::{AccountDirectory, ResolvedAccount, ResolvedAccounts, resolve};
use crate::ledger::LedgerError;
use crate::posting::{DateWindow, LedgerStore, PostingQuery};

/// Computes balances and reports from a ledger store.
#[derive(Debug)]
pub struct BalanceEngine<S, D> {
    store: S,
    directory: D,
}

impl<S, D> BalanceEngine<S, D>
where
    S: LedgerStore,
    D: AccountDirectory,
{
    /// Creates an engine over a store and a directory.
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    /// Balance of an account on `as_of`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account, or a storage error.
    pub async fn account_balance(
        &self,
        scope: ReportScope,
        account_id: AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        let account = self.account(account_id).await?;
        self.balance_in(scope, &account, DateWindow::Through(as_of))
            .await
    }

    /// Balance of an account strictly before `date`; the opening balance of
    /// a period starting on `date`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account, or a storage error.
    pub async fn account_balance_before(
        &self,
        scope: ReportScope,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        let account = self.account(account_id).await?;
        self.balance_in(scope, &account, DateWindow::Before(date))
            .await
    }

    /// Running-balance ledger of one account between two dates, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from` is after `to` and
    /// `AccountNotFound` for an unknown account.
    pub async fn account_ledger(
        &self,
        scope: ReportScope,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccountLedgerReport, LedgerError> {
        check_range(from, to)?;
        let account = self.account(account_id).await?;
        let opening_balance = self
            .balance_in(scope, &account, DateWindow::Before(from))
            .await?;

        let query = PostingQuery::new(DateWindow::Between(from, to))
            .account(account_id)
            .building(scope.building_id);
        let postings = self.store.postings(&query).await?;
        let (total_debit, total_credit) = ReportService::sum_sides(&postings);

        let mut chart = ResolvedAccounts::new();
        chart.insert_account(account.clone());
        let openings = HashMap::from([(account_id, opening_balance)]);
        let rows = ReportService::running_rows(&postings, &chart, &openings)?;
        let closing_balance = rows
            .last()
            .map_or(opening_balance, |row| row.running.current_balance);

        debug!(%account_id, rows = rows.len(), "account ledger built");
        Ok(AccountLedgerReport {
            account_id,
            name: account.info.name.clone(),
            normal_side: account.normal_side(),
            from,
            to,
            opening_balance,
            rows,
            total_debit,
            total_credit,
            closing_balance,
        })
    }

    /// Every split between two dates, each account's running balance
    /// seeded with its opening balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from` is after `to`.
    pub async fn transaction_detail(
        &self,
        scope: ReportScope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<TransactionDetailReport, LedgerError> {
        check_range(from, to)?;
        let (chart, accounts) = self.chart().await?;

        let before = self
            .store
            .postings(&PostingQuery::new(DateWindow::Before(from)).building(scope.building_id))
            .await?;
        let openings: HashMap<AccountId, Decimal> = ReportService::sums_by_account(&before)
            .into_iter()
            .map(|(id, (debit, credit))| {
                let side = chart.account(id)?.normal_side();
                Ok((id, side.balance_change(debit, credit)))
            })
            .collect::<Result<_, LedgerError>>()?;

        let postings = self
            .store
            .postings(&PostingQuery::new(DateWindow::Between(from, to)).building(scope.building_id))
            .await?;
        let (total_debit, total_credit) = ReportService::sum_sides(&postings);
        let rows = ReportService::running_rows(&postings, &chart, &openings)?;

        debug!(accounts = accounts.len(), rows = rows.len(), "transaction detail built");
        Ok(TransactionDetailReport {
            from,
            to,
            building_id: scope.building_id,
            rows,
            total_debit,
            total_credit,
        })
    }

    /// Trial balance on `as_of`, listing accounts with postings.
    ///
    /// # Errors
    ///
    /// Returns a storage or directory error.
    pub async fn trial_balance(
        &self,
        scope: ReportScope,
        as_of: NaiveDate,
    ) -> Result<TrialBalanceReport, LedgerError> {
        let balances = self.balances(scope, as_of).await?;
        Ok(ReportService::generate_trial_balance(as_of, scope, balances))
    }

    /// Balance sheet on `as_of`.
    ///
    /// # Errors
    ///
    /// Returns a storage or directory error.
    pub async fn balance_sheet(
        &self,
        scope: ReportScope,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, LedgerError> {
        let balances = self.balances(scope, as_of).await?;
        Ok(ReportService::generate_balance_sheet(as_of, scope, balances))
    }

    async fn balances(
        &self,
        scope: ReportScope,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountBalance>, LedgerError> {
        let (_, accounts) = self.chart().await?;
        let postings = self
            .store
            .postings(&PostingQuery::new(DateWindow::Through(as_of)).building(scope.building_id))
            .await?;
        let sums = ReportService::sums_by_account(&postings);

        Ok(accounts
            .iter()
            .filter_map(|account| {
                let (debit, credit) = sums.get(&account.info.id)?;
                Some(ReportService::account_balance(account, *debit, *credit))
            })
            .collect())
    }

    async fn balance_in(
        &self,
        scope: ReportScope,
        account: &ResolvedAccount,
        window: DateWindow,
    ) -> Result<Decimal, LedgerError> {
        let query = PostingQuery::new(window)
            .account(account.info.id)
            .building(scope.building_id);
        let postings = self.store.postings(&query).await?;
        let (debit, credit) = ReportService::sum_sides(&postings);
        Ok(account.normal_side().balance_change(debit, credit))
    }

    async fn account(&self, account_id: AccountId) -> Result<ResolvedAccount, LedgerError> {
        let resolved = resolve(&self.directory, &[account_id], &[]).await?;
        resolved.account(account_id).cloned()
    }

    /// The whole chart, as a lookup and in name order.
    async fn chart(&self) -> Result<(ResolvedAccounts, Vec<ResolvedAccount>), LedgerError> {
        let ids: Vec<AccountId> = self
            .directory
            .accounts()
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let chart = resolve(&self.directory, &ids, &[]).await?;
        let ordered = ids
            .iter()
            .map(|id| chart.account(*id).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok((chart, ordered))
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), LedgerError> {
    if from > to {
        return Err(LedgerError::InvalidDateRange {
            start: from,
            end: to,
        });
    }
    Ok(())
}
