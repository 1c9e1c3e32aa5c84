//! `SeaORM` entity prelude.

pub use super::account_types::Entity as AccountTypes;
pub use super::accounts::Entity as Accounts;
pub use super::applied_credits::Entity as AppliedCredits;
pub use super::document_lines::Entity as DocumentLines;
pub use super::documents::Entity as Documents;
pub use super::items::Entity as Items;
pub use super::splits::Entity as Splits;
pub use super::transactions::Entity as Transactions;
