//! Package resource: list, create, show, edit, update and delete.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use handlers::PackageState;
pub use routes::routes;
pub use services::PackageService;
pub use stores::PgPackageStore;
