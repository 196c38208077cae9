//! Parlors offering packages. Read-only here.

pub mod models;
pub mod stores;

pub use models::Parlor;
pub use stores::{ParlorStore, PgParlorStore};
