//! Document request types and their field-level validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use propledger_shared::types::{
    AccountId, DocumentId, ItemId, PartyId, UnitId, checked_sum, parse_rate, round_cents,
};

use crate::ledger::{FieldError, LedgerError};

/// Accumulates field errors so a request reports all of them at once.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub(crate) fn check(&mut self, ok: bool, field: impl Into<String>, message: &str) {
        if !ok {
            self.0.push(FieldError::new(field, message));
        }
    }

    pub(crate) fn number(&mut self, number: &str) {
        self.check(!number.trim().is_empty(), "number", "is required");
    }

    pub(crate) fn positive(&mut self, amount: Decimal, field: impl Into<String>) {
        let field = field.into();
        self.check(amount > Decimal::ZERO, field.clone(), "must be greater than zero");
        self.cents(amount, field);
    }

    pub(crate) fn cents(&mut self, amount: Decimal, field: impl Into<String>) {
        self.check(
            round_cents(amount) == amount,
            field,
            "must not have fractions of a cent",
        );
    }

    pub(crate) fn finish(self) -> Result<(), LedgerError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(self.0))
        }
    }
}

/// One item line on an invoice or sales receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    /// The item sold, discounted or paid.
    pub item_id: ItemId,
    /// Line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Quantity, 1 when absent.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Rate as entered; the item's rate is used when absent.
    #[serde(default)]
    pub rate: Option<String>,
    /// Unit override for this line.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
}

impl ItemLine {
    /// Creates a line for `quantity` units at `rate`.
    #[must_use]
    pub fn new(item_id: ItemId, quantity: Decimal, rate: &str) -> Self {
        Self {
            item_id,
            description: None,
            quantity: Some(quantity),
            rate: Some(rate.to_string()),
            unit_id: None,
        }
    }

    fn validate(&self, index: usize, errors: &mut FieldErrors) {
        if let Some(quantity) = self.quantity {
            errors.check(
                quantity > Decimal::ZERO,
                format!("items[{index}].quantity"),
                "must be greater than zero",
            );
        }
        if let Some(rate) = &self.rate {
            errors.check(
                parse_rate(rate).is_ok(),
                format!("items[{index}].rate"),
                "must be a number",
            );
        }
    }
}

/// Sales invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// Invoice number, unique per building.
    pub number: String,
    /// Billed customer.
    pub customer_id: Option<PartyId>,
    /// Unit billed.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Accounts receivable account.
    pub ar_account_id: AccountId,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Item lines.
    pub items: Vec<ItemLine>,
}

impl InvoiceRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.number(&self.number);
        errors.check(!self.items.is_empty(), "items", "at least one item is required");
        if let Some(due) = self.due_date {
            errors.check(due >= self.invoice_date, "due_date", "must not precede invoice_date");
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate(i, &mut errors);
        }
        errors.finish()
    }
}

/// One expense line on a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    /// Expense (or payable) account debited.
    pub account_id: AccountId,
    /// Line amount.
    pub amount: Decimal,
    /// Line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Party override for this line.
    #[serde(default)]
    pub party_id: Option<PartyId>,
    /// Unit override for this line.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
}

/// Check paying one or more expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Check number, unique per building.
    pub number: String,
    /// Payee.
    #[serde(default)]
    pub vendor_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Check date.
    pub check_date: NaiveDate,
    /// Bank account credited.
    pub payment_account_id: AccountId,
    /// Check total; must equal the sum of the expense lines.
    pub amount: Decimal,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Expense lines.
    pub expenses: Vec<ExpenseLine>,
}

impl CheckRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.number(&self.number);
        errors.positive(self.amount, "amount");
        errors.check(
            !self.expenses.is_empty(),
            "expenses",
            "at least one expense line is required",
        );
        for (i, line) in self.expenses.iter().enumerate() {
            errors.positive(line.amount, format!("expenses[{i}].amount"));
        }
        match checked_sum(self.expenses.iter().map(|l| l.amount)) {
            Some(lines) => errors.check(
                self.expenses.is_empty() || lines == self.amount,
                "amount",
                "must equal the sum of the expense lines",
            ),
            None => errors.check(false, "expenses", "sum of the expense lines is out of range"),
        }
        errors.finish()
    }
}

/// Credit memo issued to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditMemoRequest {
    /// Credit memo number, unique per building.
    pub number: String,
    /// Credited customer.
    pub customer_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Credit memo date.
    pub memo_date: NaiveDate,
    /// Account debited.
    pub deposit_account_id: AccountId,
    /// Liability account credited.
    pub liability_account_id: AccountId,
    /// Credit amount.
    pub amount: Decimal,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

impl CreditMemoRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.number(&self.number);
        errors.positive(self.amount, "amount");
        errors.finish()
    }
}

/// One general journal line. Exactly one side must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    #[serde(default)]
    pub debit: Option<Decimal>,
    /// Credit amount.
    #[serde(default)]
    pub credit: Option<Decimal>,
    /// Line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Customer or vendor.
    #[serde(default)]
    pub party_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Some(amount),
            credit: None,
            description: None,
            party_id: None,
            unit_id: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: None,
            credit: Some(amount),
            description: None,
            party_id: None,
            unit_id: None,
        }
    }

    /// Sets the party.
    #[must_use]
    pub fn with_party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }
}

/// General journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRequest {
    /// Journal number, unique per building.
    pub number: String,
    /// Journal date.
    pub journal_date: NaiveDate,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Journal lines.
    pub lines: Vec<JournalLine>,
}

impl JournalRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.number(&self.number);
        errors.check(!self.lines.is_empty(), "lines", "at least one line is required");
        for (i, line) in self.lines.iter().enumerate() {
            match (line.debit, line.credit) {
                (Some(amount), None) => errors.positive(amount, format!("lines[{i}].debit")),
                (None, Some(amount)) => errors.positive(amount, format!("lines[{i}].credit")),
                (Some(_), Some(_)) => errors.check(
                    false,
                    format!("lines[{i}]"),
                    "cannot have both a debit and a credit",
                ),
                (None, None) => {
                    errors.check(false, format!("lines[{i}]"), "needs a debit or a credit");
                }
            }
        }
        errors.finish()
    }
}

/// Sales receipt deposited straight to a cash or bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReceiptRequest {
    /// Receipt number, unique per building.
    pub number: String,
    /// Customer.
    #[serde(default)]
    pub customer_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Receipt date.
    pub receipt_date: NaiveDate,
    /// Cash or bank account.
    pub deposit_account_id: AccountId,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Item lines.
    pub items: Vec<ItemLine>,
}

impl SalesReceiptRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.number(&self.number);
        errors.check(!self.items.is_empty(), "items", "at least one item is required");
        for (i, item) in self.items.iter().enumerate() {
            item.validate(i, &mut errors);
        }
        errors.finish()
    }
}

/// Customer payment against an invoice. A negative amount reverses one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePaymentRequest {
    /// Invoice paid.
    pub invoice_id: DocumentId,
    /// Paying customer.
    pub customer_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Signed amount.
    pub amount: Decimal,
    /// Cash or bank account.
    pub asset_account_id: AccountId,
    /// Accounts receivable account.
    pub ar_account_id: AccountId,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

impl InvoicePaymentRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.check(self.amount != Decimal::ZERO, "amount", "must not be zero");
        errors.cents(self.amount, "amount");
        errors.finish()
    }
}

/// Discount applied to an invoice after issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscountRequest {
    /// Invoice discounted.
    pub invoice_id: DocumentId,
    /// Customer.
    pub customer_id: Option<PartyId>,
    /// Unit.
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    /// Discount date.
    pub discount_date: NaiveDate,
    /// Discount amount.
    pub amount: Decimal,
    /// Income account debited.
    pub income_account_id: AccountId,
    /// Accounts receivable account credited.
    pub ar_account_id: AccountId,
    /// Memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

impl AppliedDiscountRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.positive(self.amount, "amount");
        errors.finish()
    }
}

/// Applies part of a credit memo to an invoice. Never posts to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCreditRequest {
    /// Credit memo drawn from.
    pub credit_memo_id: DocumentId,
    /// Invoice applied to.
    pub invoice_id: DocumentId,
    /// Amount applied.
    pub amount: Decimal,
    /// Date applied.
    pub applied_date: NaiveDate,
}

impl AppliedCreditRequest {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every invalid field.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = FieldErrors::default();
        errors.positive(self.amount, "amount");
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn fields(err: LedgerError) -> Vec<String> {
        err.fields().into_iter().map(|f| f.field).collect()
    }

    #[test]
    fn test_invoice_reports_every_bad_field() {
        let mut line = ItemLine::new(ItemId::new(), dec!(0), "abc");
        line.description = Some("Rent".into());
        let request = InvoiceRequest {
            number: "  ".into(),
            customer_id: None,
            unit_id: None,
            invoice_date: date(),
            due_date: date().pred_opt(),
            ar_account_id: AccountId::new(),
            memo: None,
            reference: None,
            items: vec![line],
        };

        let err = request.validate().unwrap_err();
        assert_eq!(
            fields(err),
            vec!["number", "due_date", "items[0].quantity", "items[0].rate"]
        );
    }

    #[test]
    fn test_check_amount_must_match_lines() {
        let request = CheckRequest {
            number: "1001".into(),
            vendor_id: None,
            unit_id: None,
            check_date: date(),
            payment_account_id: AccountId::new(),
            amount: dec!(100.00),
            memo: None,
            reference: None,
            expenses: vec![ExpenseLine {
                account_id: AccountId::new(),
                amount: dec!(90.00),
                description: None,
                party_id: None,
                unit_id: None,
            }],
        };
        assert_eq!(fields(request.validate().unwrap_err()), vec!["amount"]);

        let mut request = request;
        request.amount = dec!(90.00);
        assert!(request.validate().is_ok());

        let mut extra = request.expenses[0].clone();
        extra.amount = Decimal::MAX;
        request.expenses.push(extra);
        assert_eq!(fields(request.validate().unwrap_err()), vec!["expenses"]);
    }

    #[test]
    fn test_journal_line_needs_exactly_one_side() {
        let mut both = JournalLine::debit(AccountId::new(), dec!(1));
        both.credit = Some(dec!(1));
        let mut neither = JournalLine::debit(AccountId::new(), dec!(1));
        neither.debit = None;
        let request = JournalRequest {
            number: "J-1".into(),
            journal_date: date(),
            unit_id: None,
            memo: None,
            reference: None,
            lines: vec![both, neither, JournalLine::credit(AccountId::new(), dec!(-5))],
        };
        assert_eq!(
            fields(request.validate().unwrap_err()),
            vec!["lines[0]", "lines[1]", "lines[2].credit"]
        );
    }

    #[test]
    fn test_payment_amount_may_be_negative_but_not_zero() {
        let mut request = InvoicePaymentRequest {
            invoice_id: DocumentId::new(),
            customer_id: None,
            unit_id: None,
            payment_date: date(),
            amount: dec!(-25),
            asset_account_id: AccountId::new(),
            ar_account_id: AccountId::new(),
            memo: None,
            reference: None,
        };
        assert!(request.validate().is_ok());
        request.amount = Decimal::ZERO;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_applied_credit_amount_positive() {
        let request = AppliedCreditRequest {
            credit_memo_id: DocumentId::new(),
            invoice_id: DocumentId::new(),
            amount: dec!(0),
            applied_date: date(),
        };
        assert!(matches!(request.validate(), Err(LedgerError::Validation(_))));
    }
}
