mod parlor_store;

pub use parlor_store::{ParlorStore, PgParlorStore};
