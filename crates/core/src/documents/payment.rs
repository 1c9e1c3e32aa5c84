//! Compilers for documents applied against an invoice: payments and
//! discounts.

use rust_decimal::Decimal;

use super::common::{CompiledDocument, finish};
use super::request::{AppliedDiscountRequest, InvoicePaymentRequest};
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, EntryType, LedgerError, SplitCandidate};

/// Compiles a payment: debit the asset account, credit A/R.
///
/// A negative amount reverses a payment, swapping the sides while
/// keeping the magnitudes positive.
///
/// # Errors
///
/// Returns `AccountNotFound`, `MissingParty` or an invariant error.
pub fn compile_invoice_payment(
    request: &InvoicePaymentRequest,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    let asset_side = if request.amount < Decimal::ZERO {
        EntryType::Credit
    } else {
        EntryType::Debit
    };
    let amount = request.amount.abs();
    let splits = vec![
        SplitCandidate::new(request.asset_account_id, asset_side, amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
        SplitCandidate::new(request.ar_account_id, asset_side.opposite(), amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
    ];
    finish(
        DocumentType::InvoicePayment,
        splits,
        Vec::new(),
        request.amount,
        None,
        resolved,
    )
}

/// Compiles an applied discount: debit income, credit A/R.
///
/// # Errors
///
/// Returns `AccountNotFound`, `MissingParty` or an invariant error.
pub fn compile_applied_discount(
    request: &AppliedDiscountRequest,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    let splits = vec![
        SplitCandidate::debit(request.income_account_id, request.amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
        SplitCandidate::credit(request.ar_account_id, request.amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
    ];
    finish(
        DocumentType::AppliedDiscount,
        splits,
        Vec::new(),
        request.amount,
        None,
        resolved,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Chart, date};
    use propledger_shared::types::DocumentId;
    use rust_decimal_macros::dec;

    fn payment(chart: &Chart, amount: Decimal) -> InvoicePaymentRequest {
        InvoicePaymentRequest {
            invoice_id: DocumentId::new(),
            customer_id: Some(chart.customer),
            unit_id: None,
            payment_date: date(2024, 3, 5),
            amount,
            asset_account_id: chart.cash,
            ar_account_id: chart.ar,
            memo: None,
            reference: None,
        }
    }

    #[test]
    fn test_payment_debits_asset_credits_receivable() {
        let chart = Chart::new();
        let compiled = compile_invoice_payment(&payment(&chart, dec!(300)), &chart.resolved())
            .unwrap();
        assert_eq!(
            (compiled.splits[0].account_id, compiled.splits[0].entry_type),
            (chart.cash, EntryType::Debit)
        );
        assert_eq!(
            (compiled.splits[1].account_id, compiled.splits[1].entry_type),
            (chart.ar, EntryType::Credit)
        );
        assert_eq!(compiled.total, dec!(300));
    }

    #[test]
    fn test_negative_payment_swaps_sides() {
        let chart = Chart::new();
        let compiled = compile_invoice_payment(&payment(&chart, dec!(-300)), &chart.resolved())
            .unwrap();
        assert_eq!(compiled.splits[0].entry_type, EntryType::Credit);
        assert_eq!(compiled.splits[1].entry_type, EntryType::Debit);
        assert!(compiled.splits.iter().all(|s| s.amount == dec!(300)));
        assert_eq!(compiled.total, dec!(-300));
    }

    #[test]
    fn test_payment_without_customer_rejected() {
        let chart = Chart::new();
        let mut request = payment(&chart, dec!(10));
        request.customer_id = None;
        assert!(matches!(
            compile_invoice_payment(&request, &chart.resolved()),
            Err(LedgerError::MissingParty { .. })
        ));
    }

    #[test]
    fn test_applied_discount_posts() {
        let chart = Chart::new();
        let request = AppliedDiscountRequest {
            invoice_id: DocumentId::new(),
            customer_id: Some(chart.customer),
            unit_id: None,
            discount_date: date(2024, 3, 6),
            amount: dec!(20),
            income_account_id: chart.discounts,
            ar_account_id: chart.ar,
            memo: None,
            reference: None,
        };
        let compiled = compile_applied_discount(&request, &chart.resolved()).unwrap();
        assert_eq!(compiled.splits[0].account_id, chart.discounts);
        assert_eq!(compiled.splits[0].entry_type, EntryType::Debit);
        assert_eq!(compiled.splits[1].account_id, chart.ar);
        assert_eq!(compiled.splits[1].entry_type, EntryType::Credit);
        assert!(compiled.totals.is_balanced);
    }
}
