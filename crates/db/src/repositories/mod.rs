//! Repository implementations of the ledger's storage traits.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the posting engine.

mod convert;
pub mod directory;
pub mod ledger;

pub use directory::SeaAccountDirectory;
pub use ledger::{SeaLedgerStore, SeaLedgerWriter};
