//! `SeaORM` entity definitions.

pub mod prelude;

pub mod account_types;
pub mod accounts;
pub mod applied_credits;
pub mod document_lines;
pub mod documents;
pub mod items;
pub mod sea_orm_active_enums;
pub mod splits;
pub mod transactions;
