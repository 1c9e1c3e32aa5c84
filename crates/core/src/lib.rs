//! Core posting logic for Propledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage and reference data sit behind traits; the database crate and the
//! in-memory implementations here both satisfy them.
//!
//! # Modules
//!
//! - `ledger` - Transactions, splits and the balance invariant
//! - `accounts` - Account directory and up-front reference resolution
//! - `documents` - Business documents and their split compilers
//! - `posting` - Ledger store traits and the posting coordinator
//! - `reports` - Balances, running-balance ledgers and statements

pub mod accounts;
pub mod documents;
pub mod ledger;
pub mod posting;
pub mod reports;

#[cfg(test)]
mod testing;
