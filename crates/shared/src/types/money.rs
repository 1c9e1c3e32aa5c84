//! Decimal helpers for ledger amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; ledger lines are stored
//! at two decimal places.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places persisted on ledger lines.
pub const CENT_SCALE: u32 = 2;

/// Error returned when a rate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateParseError {
    /// The rate was empty or whitespace.
    #[error("rate is empty")]
    Empty,
    /// The rate is not a decimal number.
    #[error("rate '{0}' is not a decimal number")]
    Invalid(String),
}

/// Rounds an amount to cents, half away from zero (60.015 -> 60.02).
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums amounts, returning `None` if the total leaves `Decimal`'s range.
#[must_use]
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// Parses a user-entered rate such as `"50.00"`, `"-12.5"` or `"1,250.00"`.
///
/// Thousands separators and surrounding whitespace are tolerated; the value
/// keeps its full precision so that grouped totals round only once.
pub fn parse_rate(raw: &str) -> Result<Decimal, RateParseError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(RateParseError::Empty);
    }
    Decimal::from_str(&cleaned).map_err(|_| RateParseError::Invalid(raw.trim().to_string()))
}
