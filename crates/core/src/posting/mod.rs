//! Posting: the store seam, its in-memory implementation and the
//! coordinator that writes documents through it.

pub mod coordinator;
pub mod memory;
pub mod store;


pub use coordinator::{PostedDocument, PostingContext, PostingCoordinator};
pub use memory::{MemoryLedgerStore, MemoryLedgerWriter};
pub use store::{DateWindow, LedgerStore, LedgerWriter, Posting, PostingQuery};
