//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - PostgreSQL implementations of the ledger store and account directory
//! - Database migrations

// Entity items mirror the migration's columns; the derives emit undocumented types.
#[allow(missing_docs)]
pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{SeaAccountDirectory, SeaLedgerStore, SeaLedgerWriter};

use std::time::Duration;

use propledger_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
