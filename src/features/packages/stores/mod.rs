mod package_store;

pub use package_store::{PackageStore, PgPackageStore};
