//! Invoice compiler.
//!
//! Split order: A/R debit, service income credits (one per income
//! account), discount debits, payment debits. The first service credit
//! absorbs any rounding drift.

use rust_decimal::Decimal;

use propledger_shared::types::AccountId;

use super::balancing::BalancingPolicy;
use super::common::{CompiledDocument, Grouped, finish, net_of};
use super::items::{SaleRole, price_lines};
use super::request::InvoiceRequest;
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, LedgerError, SplitCandidate};

/// Compiles an invoice into balanced splits.
///
/// # Errors
///
/// - `ItemNotFound` / `AccountNotFound` for unresolved references
/// - `Validation` for unsellable items, bad rates or a negative total
/// - `MissingParty` when the A/R split has no customer
/// - balancing errors per `policy`
pub fn compile_invoice(
    request: &InvoiceRequest,
    resolved: &ResolvedAccounts,
    policy: BalancingPolicy,
) -> Result<CompiledDocument, LedgerError> {
    let party = request.customer_id;
    let unit = request.unit_id;
    let (priced, lines) = price_lines(&request.items, party, unit, resolved)?;

    let mut services: Grouped<AccountId> = Grouped::new();
    let mut discounts: Grouped<AccountId> = Grouped::new();
    let mut payments: Grouped<AccountId> = Grouped::new();
    for line in priced {
        match line.role {
            SaleRole::Service => services.add(line.account_id, line.amount)?,
            SaleRole::Discount => discounts.add(line.account_id, line.amount.abs())?,
            SaleRole::Payment => payments.add(line.account_id, line.amount.abs())?,
        }
    }

    let net = net_of(
        services.raw_total()?,
        &[discounts.raw_total()?, payments.raw_total()?],
    )?;
    if net < Decimal::ZERO {
        return Err(LedgerError::invalid(
            "items",
            format!("invoice total cannot be negative, got {net}"),
        ));
    }

    let mut splits = Vec::new();
    if net > Decimal::ZERO {
        splits.push(
            SplitCandidate::debit(request.ar_account_id, net)
                .with_party(party)
                .with_unit(unit),
        );
    }

    let first_service = splits.len();
    for (account_id, amount) in services.rounded() {
        if amount < Decimal::ZERO {
            return Err(LedgerError::invalid(
                "items",
                format!("service total for account {account_id} is negative"),
            ));
        }
        splits.push(
            SplitCandidate::credit(account_id, amount)
                .with_party(party)
                .with_unit(unit),
        );
    }
    let target = (splits.len() > first_service).then_some(first_service);

    for (account_id, amount) in discounts.rounded().chain(payments.rounded()) {
        splits.push(
            SplitCandidate::debit(account_id, amount)
                .with_party(party)
                .with_unit(unit),
        );
    }

    let correction = policy.settle(&mut splits, target)?;
    finish(
        DocumentType::Invoice,
        splits,
        lines,
        net,
        correction,
        resolved,
    )
}
