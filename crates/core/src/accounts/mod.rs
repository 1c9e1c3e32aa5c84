//! Account directory: the narrow read interface over accounts, account
//! types and items.

pub mod directory;
pub mod resolve;
pub mod types;

pub use directory::{AccountDirectory, MemoryDirectory};
pub use resolve::{ResolvedAccount, ResolvedAccounts, resolve};
pub use types::{AccountCategory, AccountInfo, AccountTypeInfo, ItemInfo, ItemType};
