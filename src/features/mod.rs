pub mod categories;
pub mod packages;
pub mod parlors;
