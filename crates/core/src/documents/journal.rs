//! General journal compiler.

use rust_decimal::Decimal;

use super::common::{CompiledDocument, finish, out_of_range};
use super::request::JournalRequest;
use crate::accounts::ResolvedAccounts;
use crate::ledger::{DocumentType, EntryType, LedgerError, LineDraft, SplitCandidate};

/// Compiles a journal: one split per line, on the side the line states.
///
/// # Errors
///
/// Returns a validation error for a line with both or neither side set,
/// `AccountNotFound`, `MissingParty`, or `UnbalancedTransaction` when
/// the lines do not balance.
pub fn compile_journal(
    request: &JournalRequest,
    resolved: &ResolvedAccounts,
) -> Result<CompiledDocument, LedgerError> {
    let mut splits = Vec::with_capacity(request.lines.len());
    let mut lines = Vec::with_capacity(request.lines.len());
    let mut total = Decimal::ZERO;

    for (i, line) in request.lines.iter().enumerate() {
        let (entry_type, amount) = match (line.debit, line.credit) {
            (Some(amount), None) => (EntryType::Debit, amount),
            (None, Some(amount)) => (EntryType::Credit, amount),
            _ => {
                return Err(LedgerError::invalid(
                    format!("lines[{i}]"),
                    "exactly one of debit or credit must be set",
                ));
            }
        };
        if entry_type == EntryType::Debit {
            total = total
                .checked_add(amount)
                .ok_or_else(|| out_of_range(format!("lines[{i}].debit")))?;
        }
        let unit_id = line.unit_id.or(request.unit_id);
        splits.push(
            SplitCandidate::new(line.account_id, entry_type, amount)
                .with_party(line.party_id)
                .with_unit(unit_id)
                .with_memo(line.description.clone()),
        );
        lines.push(LineDraft {
            account_id: Some(line.account_id),
            description: line.description.clone(),
            amount,
            entry_type: Some(entry_type),
            party_id: line.party_id,
            unit_id,
            ..LineDraft::default()
        });
    }

    finish(DocumentType::Journal, splits, lines, total, None, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::request::JournalLine;
    use crate::testing::{Chart, date};
    use rust_decimal_macros::dec;

    fn journal(lines: Vec<JournalLine>) -> JournalRequest {
        JournalRequest {
            number: "JE-1".into(),
            journal_date: date(2024, 6, 30),
            unit_id: None,
            memo: Some("Reclass".into()),
            reference: None,
            lines,
        }
    }

    #[test]
    fn test_journal_sides_follow_lines() {
        let chart = Chart::new();
        let request = journal(vec![
            JournalLine::debit(chart.repairs, dec!(100)),
            JournalLine::credit(chart.utilities, dec!(100)),
        ]);
        let compiled = compile_journal(&request, &chart.resolved()).unwrap();
        assert_eq!(compiled.splits[0].entry_type, EntryType::Debit);
        assert_eq!(compiled.splits[1].entry_type, EntryType::Credit);
        assert_eq!(compiled.total, dec!(100));
        assert_eq!(compiled.lines[1].entry_type, Some(EntryType::Credit));
    }

    #[test]
    fn test_unbalanced_journal_rejected() {
        let chart = Chart::new();
        let request = journal(vec![
            JournalLine::debit(chart.repairs, dec!(100)),
            JournalLine::credit(chart.utilities, dec!(90)),
        ]);
        assert!(matches!(
            compile_journal(&request, &chart.resolved()),
            Err(LedgerError::UnbalancedTransaction { .. })
        ));
    }

    #[test]
    fn test_line_with_both_sides_rejected() {
        let chart = Chart::new();
        let mut both = JournalLine::debit(chart.repairs, dec!(5));
        both.credit = Some(dec!(5));
        let request = journal(vec![both, JournalLine::credit(chart.utilities, dec!(5))]);
        let err = compile_journal(&request, &chart.resolved()).unwrap_err();
        assert_eq!(err.fields()[0].field, "lines[0]");
    }

    #[test]
    fn test_receivable_line_needs_party() {
        let chart = Chart::new();
        let request = journal(vec![
            JournalLine::debit(chart.ar, dec!(75)),
            JournalLine::credit(chart.rent_income, dec!(75)),
        ]);
        assert!(matches!(
            compile_journal(&request, &chart.resolved()),
            Err(LedgerError::MissingParty { .. })
        ));

        let request = journal(vec![
            JournalLine::debit(chart.ar, dec!(75)).with_party(chart.customer),
            JournalLine::credit(chart.rent_income, dec!(75)),
        ]);
        assert!(compile_journal(&request, &chart.resolved()).is_ok());
    }

    #[test]
    fn test_single_line_journal_rejected() {
        let chart = Chart::new();
        let request = journal(vec![JournalLine::debit(chart.repairs, dec!(5))]);
        assert!(matches!(
            compile_journal(&request, &chart.resolved()),
            Err(LedgerError::InsufficientSplits { count: 1 })
        ));
    }

    #[test]
    fn test_overflowing_debit_total_rejected() {
        let chart = Chart::new();
        let request = journal(vec![
            JournalLine::debit(chart.repairs, Decimal::MAX),
            JournalLine::debit(chart.utilities, dec!(1)),
            JournalLine::credit(chart.cash, dec!(1)),
        ]);
        let err = compile_journal(&request, &chart.resolved()).unwrap_err();
        assert_eq!(err.fields()[0].field, "lines[1].debit");
    }
}
