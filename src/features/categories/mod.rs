//! Package categories. Read-only here: they only populate the package forms.

pub mod models;
pub mod stores;

pub use models::{Category, CategoryType};
pub use stores::{CategoryStore, PgCategoryStore};
