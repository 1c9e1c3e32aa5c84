//! Property-based tests for split validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use propledger_shared::types::AccountId;

use super::error::LedgerError;
use super::split::SplitCandidate;
use super::types::EntryType;
use super::validation::validate_candidates;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-positive amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

/// Balanced candidates: N debits and one credit for their sum.
fn balanced_candidates() -> impl Strategy<Value = Vec<SplitCandidate>> {
    prop::collection::vec(positive_amount(), 1..10).prop_map(|amounts| {
        let total: Decimal = amounts.iter().copied().sum();
        let mut candidates: Vec<SplitCandidate> = amounts
            .into_iter()
            .map(|a| SplitCandidate::debit(AccountId::new(), a))
            .collect();
        candidates.push(SplitCandidate::credit(AccountId::new(), total));
        candidates
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any set of debits offset by one credit for their sum validates, and
    /// the returned totals are equal.
    #[test]
    fn prop_balanced_candidates_accepted(candidates in balanced_candidates()) {
        let totals = validate_candidates(&candidates);
        prop_assert!(totals.is_ok(), "balanced set rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Moving any one split by at least a cent breaks the balance.
    #[test]
    fn prop_cent_offset_rejected(
        candidates in balanced_candidates(),
        offset in positive_amount(),
        index in any::<prop::sample::Index>(),
    ) {
        let mut candidates = candidates;
        let i = index.index(candidates.len());
        candidates[i].amount += offset;

        let result = validate_candidates(&candidates);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedTransaction { .. })),
            "offset set accepted: {:?}",
            result
        );
    }

    /// A zero or negative amount is rejected whatever the other lines are.
    #[test]
    fn prop_non_positive_amount_rejected(
        entry_type in entry_type_strategy(),
        bad in non_positive_amount(),
        other in positive_amount(),
    ) {
        let candidates = vec![
            SplitCandidate::new(AccountId::new(), entry_type, bad),
            SplitCandidate::new(AccountId::new(), entry_type.opposite(), other),
        ];

        let result = validate_candidates(&candidates);
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidSplit { .. })),
            "non-positive amount accepted: {:?}",
            result
        );
    }

    /// A single split can never form a transaction.
    #[test]
    fn prop_single_split_rejected(
        entry_type in entry_type_strategy(),
        amount in positive_amount(),
    ) {
        let candidates = vec![SplitCandidate::new(AccountId::new(), entry_type, amount)];
        let result = validate_candidates(&candidates);
        let rejected = matches!(result, Err(LedgerError::InsufficientSplits { count: 1 }));
        prop_assert!(rejected, "single split accepted: {:?}", result);
    }
}
