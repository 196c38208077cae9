mod package_dto;
mod package_view;

pub use package_dto::{ListPackagesQuery, PackageDto, PackageForm, PackageInput};
pub use package_view::PackageView;
