//! Helpers shared by every compiler.

use rust_decimal::Decimal;
use tracing::debug;

use propledger_shared::types::{AccountId, checked_sum, parse_rate, round_cents};

use crate::accounts::{ItemInfo, ResolvedAccounts};
use crate::ledger::{
    DocumentType, LedgerError, LineDraft, SplitCandidate, TransactionTotals, validate_candidates,
};

/// Output of a document compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDocument {
    /// Balanced splits, in posting order.
    pub splits: Vec<SplitCandidate>,
    /// Detail lines to persist with the document.
    pub lines: Vec<LineDraft>,
    /// Document total stored on the header row.
    pub total: Decimal,
    /// Debit and credit totals of `splits`.
    pub totals: TransactionTotals,
    /// Drift absorbed by the balancing correction, if any.
    pub correction: Option<Decimal>,
}

/// Amounts summed per key, in first-seen order.
#[derive(Debug, Clone)]
pub(crate) struct Grouped<K> {
    groups: Vec<(K, Decimal)>,
}

impl<K: PartialEq> Grouped<K> {
    pub(crate) fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub(crate) fn add(&mut self, key: K, amount: Decimal) -> Result<(), LedgerError> {
        if let Some((_, total)) = self.groups.iter_mut().find(|(k, _)| *k == key) {
            *total = total
                .checked_add(amount)
                .ok_or_else(|| out_of_range("items"))?;
        } else {
            self.groups.push((key, amount));
        }
        Ok(())
    }

    /// Unrounded sum of every group.
    pub(crate) fn raw_total(&self) -> Result<Decimal, LedgerError> {
        checked_sum(self.groups.iter().map(|(_, amount)| *amount))
            .ok_or_else(|| out_of_range("items"))
    }

    /// Groups with their totals rounded to cents; zero groups are dropped.
    pub(crate) fn rounded(self) -> impl Iterator<Item = (K, Decimal)> {
        self.groups
            .into_iter()
            .map(|(k, amount)| (k, round_cents(amount)))
            .filter(|(_, amount)| !amount.is_zero())
    }
}

/// Validation error for an amount that overflows `Decimal`.
pub(crate) fn out_of_range(field: impl Into<String>) -> LedgerError {
    LedgerError::invalid(field, "amount is out of range")
}

/// `gross` less each deduction, rounded to cents first.
pub(crate) fn net_of(gross: Decimal, deductions: &[Decimal]) -> Result<Decimal, LedgerError> {
    deductions
        .iter()
        .try_fold(round_cents(gross), |net, d| net.checked_sub(round_cents(*d)))
        .ok_or_else(|| out_of_range("items"))
}

/// Unrounded `quantity x rate` for an item line.
///
/// The quantity defaults to 1 and the rate to the item's own rate.
pub(crate) fn line_amount(
    quantity: Option<Decimal>,
    rate: Option<&str>,
    item: &ItemInfo,
    field: &str,
) -> Result<Decimal, LedgerError> {
    let rate = match rate {
        Some(raw) => parse_rate(raw)
            .map_err(|e| LedgerError::invalid(format!("{field}.rate"), e.to_string()))?,
        None => item.rate.ok_or_else(|| {
            LedgerError::invalid(
                format!("{field}.rate"),
                format!("is required, item '{}' has no default rate", item.name),
            )
        })?,
    };
    quantity
        .unwrap_or(Decimal::ONE)
        .checked_mul(rate)
        .ok_or_else(|| out_of_range(format!("{field}.rate")))
}

/// Requires an item's linked account to be set and resolved.
pub(crate) fn linked_account(
    account: Option<AccountId>,
    item: &ItemInfo,
    resolved: &ResolvedAccounts,
    field: &str,
) -> Result<AccountId, LedgerError> {
    let account_id = account.ok_or_else(|| {
        LedgerError::invalid(
            format!("{field}.item_id"),
            format!("{} item '{}' has no linked account", item.item_type, item.name),
        )
    })?;
    resolved.account(account_id)?;
    Ok(account_id)
}

/// Runs the checks every compiled document must pass and assembles the
/// result.
///
/// Checks, in order: every account resolves, AR/AP splits carry a party,
/// at least two splits, amounts strictly positive, debits equal credits to
/// the cent.
pub(crate) fn finish(
    document_type: DocumentType,
    splits: Vec<SplitCandidate>,
    lines: Vec<LineDraft>,
    total: Decimal,
    correction: Option<Decimal>,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    for split in &splits {
        let account = resolved.account(split.account_id)?;
        if account.is_ar_ap && split.party_id.is_none() {
            return Err(LedgerError::MissingParty {
                account_id: split.account_id,
            });
        }
    }
    let totals = validate_candidates(&splits)?;

    debug!(
        %document_type,
        splits = splits.len(),
        lines = lines.len(),
        %total,
        "compiled document"
    );
    Ok(CompiledDocument {
        splits,
        lines,
        total,
        totals,
        correction,
    })
}
