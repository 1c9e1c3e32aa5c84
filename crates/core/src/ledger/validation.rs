//! Balance invariant checks for compiled and persisted splits.

use rust_decimal::Decimal;

use propledger_shared::types::AccountId;

use super::error::LedgerError;
use super::split::{Split, SplitCandidate};
use super::types::{EntryType, TransactionTotals};

/// Minimum number of splits in a transaction.
pub const MIN_SPLITS: usize = 2;

/// Validates that compiled candidates form a postable transaction.
///
/// Checks, in order: at least two splits, every amount strictly positive,
/// debits equal credits to the cent.
///
/// # Errors
///
/// Returns an invariant error naming the first failed rule.
pub fn validate_candidates(
    candidates: &[SplitCandidate],
) -> Result<TransactionTotals, LedgerError> {
    if candidates.len() < MIN_SPLITS {
        return Err(LedgerError::InsufficientSplits {
            count: candidates.len(),
        });
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    for candidate in candidates {
        if candidate.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidSplit {
                account_id: candidate.account_id,
                reason: format!("amount must be positive, got {}", candidate.amount),
            });
        }
        accumulate(
            &mut debit,
            &mut credit,
            candidate.account_id,
            candidate.entry_type,
            candidate.amount,
        )?;
    }

    check_balanced(TransactionTotals::new(debit, credit))
}

/// Validates the active splits of a persisted transaction.
///
/// # Errors
///
/// Returns an invariant error if a split has both or neither side set,
/// fewer than two splits are active, or the batch does not balance.
pub fn validate_splits(splits: &[Split]) -> Result<TransactionTotals, LedgerError> {
    let active: Vec<&Split> = splits.iter().filter(|s| s.is_active()).collect();
    if active.len() < MIN_SPLITS {
        return Err(LedgerError::InsufficientSplits {
            count: active.len(),
        });
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    for split in active {
        let Some((side, amount)) = split.side() else {
            return Err(LedgerError::InvalidSplit {
                account_id: split.account_id,
                reason: "exactly one of debit or credit must be set".to_string(),
            });
        };
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidSplit {
                account_id: split.account_id,
                reason: format!("amount must be positive, got {amount}"),
            });
        }
        accumulate(&mut debit, &mut credit, split.account_id, side, amount)?;
    }

    check_balanced(TransactionTotals::new(debit, credit))
}

/// Raw debit and credit sums, with no per-split checks.
///
/// # Errors
///
/// Returns `InvalidSplit` if a side total overflows.
pub fn candidate_totals(candidates: &[SplitCandidate]) -> Result<TransactionTotals, LedgerError> {
    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    for c in candidates {
        accumulate(&mut debit, &mut credit, c.account_id, c.entry_type, c.amount)?;
    }
    Ok(TransactionTotals::new(debit, credit))
}

fn accumulate(
    debit: &mut Decimal,
    credit: &mut Decimal,
    account_id: AccountId,
    side: EntryType,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let total = match side {
        EntryType::Debit => debit,
        EntryType::Credit => credit,
    };
    *total = total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::InvalidSplit {
            account_id,
            reason: format!("{side:?} total is out of range"),
        })?;
    Ok(())
}

fn check_balanced(totals: TransactionTotals) -> Result<TransactionTotals, LedgerError> {
    if totals.is_balanced {
        Ok(totals)
    } else {
        Err(LedgerError::UnbalancedTransaction {
            debit: totals.debit,
            credit: totals.credit,
        })
    }
}
