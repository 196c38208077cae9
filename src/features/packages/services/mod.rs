mod package_service;

pub use package_service::{Outcome, PackageService, INDEX_ROUTE};
