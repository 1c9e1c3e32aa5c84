//! Balancing correction for documents that aggregate heterogeneous lines.
//!
//! Invoices and sales receipts round each group total to cents separately
//! from the receivable (or deposit) total, so the two sides can drift by a
//! cent or so. [`BalancingPolicy`] decides whether that drift is folded into
//! a target split or rejected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use propledger_shared::config::{PostingConfig, RoundingMode};

use crate::ledger::{EntryType, LedgerError, SplitCandidate, candidate_totals};

/// Drift handling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BalancingPolicy {
    /// Adjust the target split by the signed drift.
    Absorb {
        /// Largest absolute drift that may be absorbed; unlimited if `None`.
        max_drift: Option<Decimal>,
    },
    /// Fail on any drift.
    Reject,
}

impl Default for BalancingPolicy {
    fn default() -> Self {
        Self::Absorb { max_drift: None }
    }
}

impl From<&PostingConfig> for BalancingPolicy {
    fn from(config: &PostingConfig) -> Self {
        match config.rounding {
            RoundingMode::Absorb => Self::Absorb {
                max_drift: config.max_drift,
            },
            RoundingMode::Reject => Self::Reject,
        }
    }
}

impl BalancingPolicy {
    /// Brings `splits` into balance by adjusting `splits[target]`.
    ///
    /// Returns the absorbed drift (debit minus credit before correction),
    /// or `None` if the splits already balanced.
    ///
    /// # Errors
    ///
    /// - `UnbalancedTransaction` under `Reject`, when there is no target, or
    ///   when the adjusted amount would not stay positive
    /// - `RoundingDriftExceeded` when the drift is above `max_drift`
    pub fn settle(
        self,
        splits: &mut [SplitCandidate],
        target: Option<usize>,
    ) -> Result<Option<Decimal>, LedgerError> {
        let totals = candidate_totals(splits)?;
        let drift = totals.difference();
        if drift.is_zero() {
            return Ok(None);
        }

        let unbalanced = LedgerError::UnbalancedTransaction {
            debit: totals.debit,
            credit: totals.credit,
        };
        let max_drift = match self {
            Self::Reject => return Err(unbalanced),
            Self::Absorb { max_drift } => max_drift,
        };
        if let Some(limit) = max_drift
            && drift.abs() > limit
        {
            return Err(LedgerError::RoundingDriftExceeded { drift, limit });
        }

        let Some(split) = target.and_then(|i| splits.get_mut(i)) else {
            return Err(unbalanced);
        };
        let adjusted = match split.entry_type {
            EntryType::Credit => split.amount.checked_add(drift),
            EntryType::Debit => split.amount.checked_sub(drift),
        };
        let Some(adjusted) = adjusted.filter(|a| *a > Decimal::ZERO) else {
            return Err(unbalanced);
        };

        warn!(
            account_id = %split.account_id,
            %drift,
            from = %split.amount,
            to = %adjusted,
            "absorbing rounding drift"
        );
        split.amount = adjusted;
        Ok(Some(drift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propledger_shared::types::AccountId;
    use rust_decimal_macros::dec;

    /// Debit 20.01 against two credits of 10.01: one cent short on credits.
    fn drifting() -> Vec<SplitCandidate> {
        vec![
            SplitCandidate::debit(AccountId::new(), dec!(20.01)),
            SplitCandidate::credit(AccountId::new(), dec!(10.01)),
            SplitCandidate::credit(AccountId::new(), dec!(10.01)),
        ]
    }

    #[test]
    fn test_balanced_splits_untouched() {
        let mut splits = vec![
            SplitCandidate::debit(AccountId::new(), dec!(5)),
            SplitCandidate::credit(AccountId::new(), dec!(5)),
        ];
        let drift = BalancingPolicy::Reject.settle(&mut splits, Some(1)).unwrap();
        assert_eq!(drift, None);
        assert_eq!(splits[1].amount, dec!(5));
    }

    #[test]
    fn test_absorb_adjusts_target_credit() {
        let mut splits = drifting();
        let drift = BalancingPolicy::default()
            .settle(&mut splits, Some(1))
            .unwrap();
        assert_eq!(drift, Some(dec!(-0.01)));
        assert_eq!(splits[1].amount, dec!(10.00));
        assert!(candidate_totals(&splits).unwrap().is_balanced);
    }

    #[test]
    fn test_absorb_adjusts_target_debit_the_other_way() {
        let mut splits = vec![
            SplitCandidate::debit(AccountId::new(), dec!(10.00)),
            SplitCandidate::debit(AccountId::new(), dec!(5.01)),
            SplitCandidate::credit(AccountId::new(), dec!(15.00)),
        ];
        BalancingPolicy::default().settle(&mut splits, Some(0)).unwrap();
        assert_eq!(splits[0].amount, dec!(9.99));
        assert!(candidate_totals(&splits).unwrap().is_balanced);
    }

    #[test]
    fn test_reject_fails_on_any_drift() {
        let mut splits = drifting();
        let err = BalancingPolicy::Reject.settle(&mut splits, Some(1)).unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedTransaction { .. }));
        assert_eq!(splits[1].amount, dec!(10.01));
    }

    #[test]
    fn test_absorb_respects_ceiling() {
        let mut splits = drifting();
        let policy = BalancingPolicy::Absorb {
            max_drift: Some(dec!(0.005)),
        };
        assert!(matches!(
            policy.settle(&mut splits, Some(1)),
            Err(LedgerError::RoundingDriftExceeded { .. })
        ));

        let policy = BalancingPolicy::Absorb {
            max_drift: Some(dec!(0.01)),
        };
        assert!(policy.settle(&mut splits, Some(1)).is_ok());
    }

    #[test]
    fn test_absorb_without_target_fails() {
        let mut splits = drifting();
        assert!(matches!(
            BalancingPolicy::default().settle(&mut splits, None),
            Err(LedgerError::UnbalancedTransaction { .. })
        ));
    }

    #[test]
    fn test_policy_from_config() {
        let config = PostingConfig {
            rounding: RoundingMode::Reject,
            max_drift: None,
        };
        assert_eq!(BalancingPolicy::from(&config), BalancingPolicy::Reject);

        let config = PostingConfig {
            rounding: RoundingMode::Absorb,
            max_drift: Some(dec!(0.02)),
        };
        assert_eq!(
            BalancingPolicy::from(&config),
            BalancingPolicy::Absorb {
                max_drift: Some(dec!(0.02))
            }
        );
    }
}
