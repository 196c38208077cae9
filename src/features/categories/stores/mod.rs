mod category_store;

pub use category_store::{CategoryStore, PgCategoryStore};
