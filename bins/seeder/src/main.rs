//! Demo seeder for Propledger development and testing.
//!
//! Creates a small property-management chart of accounts, posts a month of
//! sample documents into a fresh building, and prints the trial balance and
//! balance sheet for that building.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use propledger_core::accounts::{AccountCategory, ItemType};
use propledger_core::documents::{
    AppliedCreditRequest, BalancingPolicy, CheckRequest, CreditMemoRequest, Document, ExpenseLine,
    InvoicePaymentRequest, InvoiceRequest, ItemLine, JournalLine, JournalRequest,
};
use propledger_core::posting::{PostingContext, PostingCoordinator};
use propledger_core::reports::{BalanceEngine, BalanceSheetSection, ReportScope};
use propledger_db::{SeaAccountDirectory, SeaLedgerStore, connect};
use propledger_shared::AppConfig;
use propledger_shared::config::LoggingConfig;
use propledger_shared::types::{AccountId, BuildingId, ItemId, PartyId, UserId};

struct DemoChart {
    cash: AccountId,
    ar: AccountId,
    deposits: AccountId,
    equity: AccountId,
    repairs: AccountId,
    rent: ItemId,
    late_fee: ItemId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let directory = SeaAccountDirectory::new(db.clone());
    let store = SeaLedgerStore::new(db);
    let chart = seed_chart(&directory).await?;
    info!("Seeded chart of accounts");

    let coordinator = PostingCoordinator::new(
        store.clone(),
        directory.clone(),
        BalancingPolicy::from(&config.posting),
    );
    let ctx = PostingContext::new(BuildingId::new(), UserId::new());
    post_sample_month(&coordinator, &ctx, &chart).await?;
    info!(building_id = %ctx.building_id, "Posted sample documents");

    let engine = BalanceEngine::new(store, directory);
    let scope = ReportScope::building(ctx.building_id);
    let as_of = date(2024, 3, 31)?;

    let trial = engine.trial_balance(scope, as_of).await?;
    println!("Trial balance as of {as_of}");
    for account in &trial.accounts {
        println!(
            "  {:<24} {:>12} {:>12}",
            account.name, account.total_debit, account.total_credit
        );
    }
    println!(
        "  {:<24} {:>12} {:>12}  balanced: {}",
        "Total", trial.totals.total_debit, trial.totals.total_credit, trial.totals.is_balanced
    );

    let sheet = engine.balance_sheet(scope, as_of).await?;
    println!("\nBalance sheet as of {as_of}");
    print_section("Assets", &sheet.assets);
    print_section("Liabilities", &sheet.liabilities);
    print_section("Equity", &sheet.equity);
    println!("  Net income: {}", sheet.net_income);
    println!(
        "  Assets {} = Liabilities + Equity {}  balanced: {}",
        sheet.total_assets, sheet.liabilities_and_equity, sheet.is_balanced
    );

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid date {year}-{month}-{day}"))
}

fn print_section(title: &str, section: &BalanceSheetSection) {
    println!("  {title}");
    for account in &section.accounts {
        println!("    {:<22} {:>12}", account.name, account.balance);
    }
    println!("    {:<22} {:>12}", "Total", section.total);
}

async fn seed_chart(directory: &SeaAccountDirectory) -> anyhow::Result<DemoChart> {
    let bank = directory
        .create_account_type("Bank", AccountCategory::Asset, false)
        .await?;
    let receivable = directory
        .create_account_type("Accounts Receivable", AccountCategory::Asset, true)
        .await?;
    let liability = directory
        .create_account_type("Other Current Liability", AccountCategory::Liability, false)
        .await?;
    let equity = directory
        .create_account_type("Equity", AccountCategory::Equity, false)
        .await?;
    let income = directory
        .create_account_type("Income", AccountCategory::Income, false)
        .await?;
    let expense = directory
        .create_account_type("Expense", AccountCategory::Expense, false)
        .await?;

    let cash = directory.create_account("Operating Cash", &bank, None).await?;
    let ar = directory
        .create_account("Accounts Receivable", &receivable, None)
        .await?;
    let deposits = directory
        .create_account("Tenant Deposits", &liability, None)
        .await?;
    let owner = directory.create_account("Owner Equity", &equity, None).await?;
    let rent_income = directory.create_account("Rent Income", &income, None).await?;
    let fee_income = directory.create_account("Fee Income", &income, None).await?;
    let repairs = directory
        .create_account("Repairs & Maintenance", &expense, None)
        .await?;

    let rent = directory
        .create_item("Rent", ItemType::Service, rent_income.id, None)
        .await?;
    let late_fee = directory
        .create_item("Late Fee", ItemType::Service, fee_income.id, Some(dec!(25.00)))
        .await?;

    Ok(DemoChart {
        cash: cash.id,
        ar: ar.id,
        deposits: deposits.id,
        equity: owner.id,
        repairs: repairs.id,
        rent: rent.id,
        late_fee: late_fee.id,
    })
}

async fn post_sample_month(
    coordinator: &PostingCoordinator<SeaLedgerStore, SeaAccountDirectory>,
    ctx: &PostingContext,
    chart: &DemoChart,
) -> anyhow::Result<()> {
    let tenant = PartyId::new();
    let plumber = PartyId::new();

    coordinator
        .create(
            ctx,
            Document::Journal(JournalRequest {
                number: "OB-1".into(),
                journal_date: date(2024, 3, 1)?,
                unit_id: None,
                memo: Some("Opening balance".into()),
                reference: None,
                lines: vec![
                    JournalLine::debit(chart.cash, dec!(10000.00)),
                    JournalLine::credit(chart.equity, dec!(10000.00)),
                ],
            }),
        )
        .await?;

    let invoice = coordinator
        .create(
            ctx,
            Document::Invoice(InvoiceRequest {
                number: "INV-1001".into(),
                customer_id: Some(tenant),
                unit_id: None,
                invoice_date: date(2024, 3, 1)?,
                due_date: Some(date(2024, 3, 5)?),
                ar_account_id: chart.ar,
                memo: Some("March rent".into()),
                reference: None,
                items: vec![
                    ItemLine::new(chart.rent, Decimal::ONE, "1500.00"),
                    ItemLine {
                        item_id: chart.late_fee,
                        description: Some("Late fee".into()),
                        quantity: None,
                        rate: None,
                        unit_id: None,
                    },
                ],
            }),
        )
        .await?;

    coordinator
        .create(
            ctx,
            Document::InvoicePayment(InvoicePaymentRequest {
                invoice_id: invoice.document.id,
                customer_id: Some(tenant),
                unit_id: None,
                payment_date: date(2024, 3, 6)?,
                amount: dec!(1000.00),
                asset_account_id: chart.cash,
                ar_account_id: chart.ar,
                memo: None,
                reference: Some("ACH 5521".into()),
            }),
        )
        .await?;

    let credit_memo = coordinator
        .create(
            ctx,
            Document::CreditMemo(CreditMemoRequest {
                number: "CM-1".into(),
                customer_id: Some(tenant),
                unit_id: None,
                memo_date: date(2024, 3, 10)?,
                deposit_account_id: chart.cash,
                liability_account_id: chart.deposits,
                amount: dec!(500.00),
                memo: Some("Security deposit".into()),
                reference: None,
            }),
        )
        .await?;

    coordinator
        .apply_credit(
            ctx,
            AppliedCreditRequest {
                credit_memo_id: credit_memo.document.id,
                invoice_id: invoice.document.id,
                amount: dec!(200.00),
                applied_date: date(2024, 3, 12)?,
            },
        )
        .await?;

    coordinator
        .create(
            ctx,
            Document::Check(CheckRequest {
                number: "1001".into(),
                vendor_id: Some(plumber),
                unit_id: None,
                check_date: date(2024, 3, 15)?,
                payment_account_id: chart.cash,
                amount: dec!(350.00),
                memo: None,
                reference: None,
                expenses: vec![ExpenseLine {
                    account_id: chart.repairs,
                    amount: dec!(350.00),
                    description: Some("Water heater".into()),
                    party_id: None,
                    unit_id: None,
                }],
            }),
        )
        .await?;

    Ok(())
}
