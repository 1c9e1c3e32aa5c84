//! Credit memo application.
//!
//! Applying a credit only records a cross-reference; it produces no
//! transaction and no splits. The one rule is availability.

use propledger_shared::types::DocumentId;
use rust_decimal::Decimal;

use crate::ledger::{AppliedCredit, DocumentRecord, LedgerError, available_credit};

/// Checks that `requested` fits in the credit memo's unapplied balance.
///
/// Returns the balance available before this application.
///
/// # Errors
///
/// Returns `InsufficientCredit` when `requested` exceeds the balance.
pub fn check_availability(
    credit_memo: &DocumentRecord,
    applied: &[AppliedCredit],
    requested: Decimal,
) -> Result<Decimal, LedgerError> {
    let available = available_credit(credit_memo.amount, applied);
    if requested > available {
        return Err(LedgerError::InsufficientCredit {
            credit_memo_id: credit_memo.id,
            available,
            requested,
        });
    }
    Ok(available)
}

/// Checks that a credit memo can be re-totalled to `new_amount` without
/// dropping below what is already applied from it.
///
/// # Errors
///
/// Returns `InsufficientCredit` with the new amount as `available` and the
/// applied sum as `requested` when the memo would be overdrawn.
pub fn check_resize(
    credit_memo_id: DocumentId,
    applied: &[AppliedCredit],
    new_amount: Decimal,
) -> Result<(), LedgerError> {
    let remaining = available_credit(new_amount, applied);
    if remaining < Decimal::ZERO {
        return Err(LedgerError::InsufficientCredit {
            credit_memo_id,
            available: new_amount,
            requested: new_amount - remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DocumentType, RecordStatus, TransactionStatus};
    use crate::testing::date;
    use chrono::Utc;
    use propledger_shared::types::{AppliedCreditId, BuildingId, TransactionId, UserId};
    use rust_decimal_macros::dec;

    fn credit_memo(amount: Decimal) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::new(),
            document_type: DocumentType::CreditMemo,
            building_id: BuildingId::new(),
            transaction_id: TransactionId::new(),
            number: Some("CM-1".into()),
            party_id: None,
            unit_id: None,
            document_date: date(2024, 1, 1),
            amount,
            invoice_id: None,
            payload: serde_json::Value::Null,
            status: TransactionStatus::Active,
            created_by: UserId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn applied(memo: &DocumentRecord, amount: Decimal) -> AppliedCredit {
        AppliedCredit {
            id: AppliedCreditId::new(),
            building_id: memo.building_id,
            credit_memo_id: memo.id,
            invoice_id: DocumentId::new(),
            amount,
            applied_date: date(2024, 1, 2),
            status: RecordStatus::Active,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_balance_can_be_applied_once() {
        let memo = credit_memo(dec!(50.00));
        assert_eq!(check_availability(&memo, &[], dec!(50.00)).unwrap(), dec!(50.00));

        let used = vec![applied(&memo, dec!(50.00))];
        let err = check_availability(&memo, &used, dec!(1.00)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientCredit { available, requested, .. }
                if available == dec!(0) && requested == dec!(1.00)
        ));
    }

    #[test]
    fn test_superseded_application_frees_credit() {
        let memo = credit_memo(dec!(50.00));
        let mut row = applied(&memo, dec!(30.00));
        row.status = RecordStatus::Superseded;
        assert_eq!(check_availability(&memo, &[row], dec!(50.00)).unwrap(), dec!(50.00));
    }

    #[test]
    fn test_resize_below_applied_rejected() {
        let memo = credit_memo(dec!(50.00));
        let used = vec![applied(&memo, dec!(30.00)), applied(&memo, dec!(15.00))];

        assert!(check_resize(memo.id, &used, dec!(45.00)).is_ok());
        let err = check_resize(memo.id, &used, dec!(10.00)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientCredit { available, requested, .. }
                if available == dec!(10.00) && requested == dec!(45.00)
        ));
    }

    #[test]
    fn test_resize_ignores_withdrawn_applications() {
        let memo = credit_memo(dec!(50.00));
        let mut row = applied(&memo, dec!(40.00));
        row.status = RecordStatus::Superseded;
        assert!(check_resize(memo.id, &[row], dec!(5.00)).is_ok());
    }
}
