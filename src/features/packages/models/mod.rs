mod package;

pub use package::{Package, PackageFields, PackageFilter, PackageSortField};
