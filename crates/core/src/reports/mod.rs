//! Balances and financial reports.
//!
//! This module provides:
//! - Point-in-time and opening account balances
//! - Account ledger and transaction detail with running balances
//! - Trial Balance
//! - Balance Sheet

pub mod engine;
pub mod service;
pub mod types;


pub use engine::BalanceEngine;
pub use service::ReportService;
pub use types::*;
