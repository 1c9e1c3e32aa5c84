//! Sales receipt compiler.
//!
//! Like an invoice, but the deposit account takes the place of A/R and
//! the postings follow the sign of each amount: a negative service line
//! debits income, and a negative net credits the deposit account.

use rust_decimal::Decimal;

use propledger_shared::types::AccountId;

use super::balancing::BalancingPolicy;
use super::common::{CompiledDocument, Grouped, finish, net_of};
use super::items::{SaleRole, price_lines};
use super::request::SalesReceiptRequest;
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, EntryType, LedgerError, SplitCandidate};

/// Compiles a sales receipt into balanced splits.
///
/// # Errors
///
/// Same classes as [`super::compile_invoice`], except that a negative
/// net is a refund rather than an error.
pub fn compile_sales_receipt(
    request: &SalesReceiptRequest,
    resolved: &ResolvedAccounts,
    policy: BalancingPolicy,
) -> Result<CompiledDocument, LedgerError> {
    let party = request.customer_id;
    let unit = request.unit_id;
    let (priced, lines) = price_lines(&request.items, party, unit, resolved)?;

    let mut income: Grouped<AccountId> = Grouped::new();
    let mut reversals: Grouped<AccountId> = Grouped::new();
    let mut discounts: Grouped<AccountId> = Grouped::new();
    let mut payments: Grouped<AccountId> = Grouped::new();
    for line in priced {
        match line.role {
            SaleRole::Service if line.amount < Decimal::ZERO => {
                reversals.add(line.account_id, -line.amount)?;
            }
            SaleRole::Service => income.add(line.account_id, line.amount)?,
            SaleRole::Discount => discounts.add(line.account_id, line.amount.abs())?,
            SaleRole::Payment => payments.add(line.account_id, line.amount.abs())?,
        }
    }

    let net = net_of(
        income.raw_total()?,
        &[
            reversals.raw_total()?,
            discounts.raw_total()?,
            payments.raw_total()?,
        ],
    )?;

    let mut splits = Vec::new();
    if !net.is_zero() {
        let side = if net > Decimal::ZERO {
            EntryType::Debit
        } else {
            EntryType::Credit
        };
        splits.push(
            SplitCandidate::new(request.deposit_account_id, side, net.abs())
                .with_party(party)
                .with_unit(unit),
        );
    }

    let first_income = splits.len();
    for (account_id, amount) in income.rounded() {
        splits.push(
            SplitCandidate::credit(account_id, amount)
                .with_party(party)
                .with_unit(unit),
        );
    }
    let first_reversal = splits.len();
    for (account_id, amount) in reversals.rounded() {
        splits.push(
            SplitCandidate::debit(account_id, amount)
                .with_party(party)
                .with_unit(unit),
        );
    }
    let target = if first_reversal > first_income {
        Some(first_income)
    } else {
        (splits.len() > first_reversal).then_some(first_reversal)
    };

    for (account_id, amount) in discounts.rounded().chain(payments.rounded()) {
        splits.push(
            SplitCandidate::debit(account_id, amount)
                .with_party(party)
                .with_unit(unit),
        );
    }

    let correction = policy.settle(&mut splits, target)?;
    finish(
        DocumentType::SalesReceipt,
        splits,
        lines,
        net,
        correction,
        resolved,
    )
}
