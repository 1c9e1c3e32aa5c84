//! Check compiler.

use propledger_shared::types::round_cents;

use super::common::{CompiledDocument, finish};
use super::request::CheckRequest;
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, LedgerError, LineDraft, SplitCandidate};

/// Compiles a check: one debit per expense line, one credit to the
/// payment account for the check total.
///
/// # Errors
///
/// Returns `AccountNotFound`, `MissingParty` or an invariant error.
pub fn compile_check(
    request: &CheckRequest,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    let mut splits = Vec::with_capacity(request.expenses.len() + 1);
    let mut lines = Vec::with_capacity(request.expenses.len());

    for line in &request.expenses {
        resolved.account(line.account_id)?;
        let party_id = line.party_id.or(request.vendor_id);
        let unit_id = line.unit_id.or(request.unit_id);
        let amount = round_cents(line.amount);
        splits.push(
            SplitCandidate::debit(line.account_id, amount)
                .with_party(party_id)
                .with_unit(unit_id)
                .with_memo(line.description.clone()),
        );
        lines.push(LineDraft {
            account_id: Some(line.account_id),
            description: line.description.clone(),
            amount,
            party_id,
            unit_id,
            ..LineDraft::default()
        });
    }

    let total = round_cents(request.amount);
    splits.push(
        SplitCandidate::credit(request.payment_account_id, total)
            .with_party(request.vendor_id)
            .with_unit(request.unit_id),
    );

    finish(DocumentType::Check, splits, lines, total, None, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::request::ExpenseLine;
    use crate::ledger::EntryType;
    use crate::testing::{Chart, date};
    use propledger_shared::types::AccountId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expense(account_id: AccountId, amount: Decimal) -> ExpenseLine {
        ExpenseLine {
            account_id,
            amount,
            description: Some("Boiler repair".into()),
            party_id: None,
            unit_id: None,
        }
    }

    fn check(chart: &Chart, expenses: Vec<ExpenseLine>) -> CheckRequest {
        let amount = expenses.iter().map(|l| l.amount).sum();
        CheckRequest {
            number: "1001".into(),
            vendor_id: Some(chart.vendor),
            unit_id: None,
            check_date: date(2024, 2, 15),
            payment_account_id: chart.cash,
            amount,
            memo: None,
            reference: None,
            expenses,
        }
    }

    #[test]
    fn test_single_expense_line() {
        let chart = Chart::new();
        let request = check(&chart, vec![expense(chart.repairs, dec!(100.00))]);
        let compiled = compile_check(&request, &chart.resolved()).unwrap();

        let sides: Vec<_> = compiled
            .splits
            .iter()
            .map(|s| (s.account_id, s.entry_type, s.amount))
            .collect();
        assert_eq!(
            sides,
            vec![
                (chart.repairs, EntryType::Debit, dec!(100.00)),
                (chart.cash, EntryType::Credit, dec!(100.00)),
            ]
        );
        assert!(compiled.totals.is_balanced);
        assert_eq!(compiled.lines.len(), 1);
    }

    #[test]
    fn test_multiple_expense_lines() {
        let chart = Chart::new();
        let request = check(
            &chart,
            vec![expense(chart.repairs, dec!(60.25)), expense(chart.utilities, dec!(39.75))],
        );
        let compiled = compile_check(&request, &chart.resolved()).unwrap();
        assert_eq!(compiled.splits.len(), 3);
        assert_eq!(compiled.total, dec!(100.00));
    }

    #[test]
    fn test_paying_a_payable_requires_vendor() {
        let chart = Chart::new();
        let mut request = check(&chart, vec![expense(chart.ap, dec!(40))]);
        assert!(compile_check(&request, &chart.resolved()).is_ok());

        request.vendor_id = None;
        let err = compile_check(&request, &chart.resolved()).unwrap_err();
        assert!(matches!(err, LedgerError::MissingParty { account_id } if account_id == chart.ap));
    }

    #[test]
    fn test_unknown_expense_account() {
        let chart = Chart::new();
        let request = check(&chart, vec![expense(AccountId::new(), dec!(10))]);
        assert!(matches!(
            compile_check(&request, &chart.resolved()),
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}
