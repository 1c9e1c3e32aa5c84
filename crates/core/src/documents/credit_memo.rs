//! Credit memo compiler.

use super::common::{CompiledDocument, finish};
use super::request::CreditMemoRequest;
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, LedgerError, SplitCandidate};

/// Compiles a credit memo: debit the deposit account, credit the
/// liability account, both for the memo amount and both tagged with the
/// customer and unit.
///
/// # Errors
///
/// Returns `AccountNotFound`, `MissingParty` or an invariant error.
pub fn compile_credit_memo(
    request: &CreditMemoRequest,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    let splits = vec![
        SplitCandidate::debit(request.deposit_account_id, request.amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
        SplitCandidate::credit(request.liability_account_id, request.amount)
            .with_party(request.customer_id)
            .with_unit(request.unit_id),
    ];
    finish(
        DocumentType::CreditMemo,
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
    use crate::ledger::EntryType;
    use crate::testing::{Chart, date};
    use rust_decimal_macros::dec;

    fn memo(chart: &Chart) -> CreditMemoRequest {
        CreditMemoRequest {
            number: "CM-7".into(),
            customer_id: Some(chart.customer),
            unit_id: None,
            memo_date: date(2024, 1, 10),
            deposit_account_id: chart.ar,
            liability_account_id: chart.deposits,
            amount: dec!(50.00),
            memo: None,
            reference: None,
        }
    }

    #[test]
    fn test_credit_memo_splits() {
        let chart = Chart::new();
        let compiled = compile_credit_memo(&memo(&chart), &chart.resolved()).unwrap();
        assert_eq!(compiled.splits[0].account_id, chart.ar);
        assert_eq!(compiled.splits[0].entry_type, EntryType::Debit);
        assert_eq!(compiled.splits[1].account_id, chart.deposits);
        assert_eq!(compiled.splits[1].entry_type, EntryType::Credit);
        assert!(compiled.splits.iter().all(|s| s.party_id == Some(chart.customer)));
        assert_eq!(compiled.total, dec!(50.00));
    }

    #[test]
    fn test_credit_memo_on_receivable_needs_customer() {
        let chart = Chart::new();
        let mut request = memo(&chart);
        request.customer_id = None;
        assert!(matches!(
            compile_credit_memo(&request, &chart.resolved()),
            Err(LedgerError::MissingParty { .. })
        ));
    }
}
