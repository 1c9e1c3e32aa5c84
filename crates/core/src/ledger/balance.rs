//! Normal-side sign rule and running balances.
//!
//! - Debit-natured accounts: balance += debit - credit
//! - Credit-natured accounts: balance += credit - debit

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::split::Split;
use super::types::EntryType;

/// The side on which an account's balance grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Asset and expense accounts.
    Debit,
    /// Liability, equity and income accounts.
    Credit,
}

impl NormalSide {
    /// Calculates the signed balance for the given debit and credit sums.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Signed contribution of one split to an account of this side.
    #[must_use]
    pub fn split_change(self, split: &Split) -> Decimal {
        self.balance_change(split.debit_amount(), split.credit_amount())
    }

    /// The entry type that increases the balance.
    #[must_use]
    pub fn increasing_entry(self) -> EntryType {
        match self {
            Self::Debit => EntryType::Debit,
            Self::Credit => EntryType::Credit,
        }
    }
}

/// Running balance after one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Row number within the account's sequence, starting at 1.
    pub sequence: i64,
    /// Balance before this row.
    pub previous_balance: Decimal,
    /// Balance after this row.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// The state before the first row, seeded with an opening balance.
    #[must_use]
    pub fn opening(balance: Decimal) -> Self {
        Self {
            sequence: 0,
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Applies the next row's balance change.
    ///
    /// `current_balance[N] = current_balance[N-1] + change`
    #[must_use]
    pub fn next(&self, change: Decimal) -> Self {
        Self {
            sequence: self.sequence + 1,
            previous_balance: self.current_balance,
            current_balance: self.current_balance + change,
        }
    }
}
