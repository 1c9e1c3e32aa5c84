//! Pricing of item lines shared by invoices and sales receipts.

use rust_decimal::Decimal;

use propledger_shared::types::{AccountId, PartyId, UnitId, round_cents};

use super::common::{line_amount, linked_account};
use super::request::ItemLine;
use crate::accounts::{ItemType, ResolvedAccounts};
use crate::ledger::{LedgerError, LineDraft};

/// Role an item line plays in a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaleRole {
    Service,
    Discount,
    Payment,
}

/// An item line priced and mapped to its posting account.
#[derive(Debug, Clone)]
pub(crate) struct PricedLine {
    pub role: SaleRole,
    pub account_id: AccountId,
    /// Signed and unrounded.
    pub amount: Decimal,
}

/// Prices every line and maps it to the account its item posts to.
///
/// Inventory and non-inventory items cannot be sold through these
/// documents and are rejected naming the line.
pub(crate) fn price_lines(
    items: &[ItemLine],
    party_id: Option<PartyId>,
    unit_id: Option<UnitId>,
    resolved: &ResolvedAccounts,
) -> Result<(Vec<PricedLine>, Vec<LineDraft>), LedgerError> {
    let mut priced = Vec::with_capacity(items.len());
    let mut drafts = Vec::with_capacity(items.len());

    for (i, line) in items.iter().enumerate() {
        let field = format!("items[{i}]");
        let item = resolved.item(line.item_id)?;
        let (role, account) = match item.item_type {
            ItemType::Service => (SaleRole::Service, item.income_account_id),
            ItemType::Discount => (SaleRole::Discount, item.income_account_id),
            ItemType::Payment => (SaleRole::Payment, item.asset_account_id),
            ItemType::Inventory | ItemType::NonInventory => {
                return Err(LedgerError::invalid(
                    format!("{field}.item_id"),
                    format!("{} item '{}' cannot be sold here", item.item_type, item.name),
                ));
            }
        };
        let account_id = linked_account(account, item, resolved, &field)?;
        let amount = line_amount(line.quantity, line.rate.as_deref(), item, &field)?;

        priced.push(PricedLine {
            role,
            account_id,
            amount,
        });
        drafts.push(LineDraft {
            account_id: Some(account_id),
            item_id: Some(item.id),
            description: line.description.clone().or_else(|| Some(item.name.clone())),
            quantity: Some(line.quantity.unwrap_or(Decimal::ONE)),
            rate: line.rate.clone(),
            amount: round_cents(amount),
            entry_type: None,
            party_id,
            unit_id: line.unit_id.or(unit_id),
        });
    }

    Ok((priced, drafts))
}
