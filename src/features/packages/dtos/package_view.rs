use minijinja::{context, Value};

use crate::features::categories::Category;
use crate::features::packages::dtos::PackageDto;
use crate::features::packages::models::{Package, PackageFilter};
use crate::features::parlors::Parlor;
use crate::modules::storage::FileStorage;
use crate::shared::flash::FlashMessage;

/// A page the package controller can render, with the data it needs
#[derive(Debug, Clone, PartialEq)]
pub enum PackageView {
    Index {
        packages: Vec<Package>,
        filter: PackageFilter,
    },
    Create {
        categories: Vec<Category>,
        parlors: Vec<Parlor>,
    },
    Show {
        package: Package,
    },
    Edit {
        package: Package,
        categories: Vec<Category>,
        parlors: Vec<Parlor>,
    },
}

impl PackageView {
    pub fn template(&self) -> &'static str {
        match self {
            PackageView::Index { .. } => "packages/index.html.jinja",
            PackageView::Create { .. } => "packages/create.html.jinja",
            PackageView::Show { .. } => "packages/show.html.jinja",
            PackageView::Edit { .. } => "packages/edit.html.jinja",
        }
    }

    /// Template context. Image references are resolved to URLs through `storage`.
    pub fn into_context(self, storage: &dyn FileStorage, flash: Option<&FlashMessage>) -> Value {
        let flash = Value::from_serialize(flash);
        match self {
            PackageView::Index { packages, filter } => {
                let packages: Vec<PackageDto> = packages
                    .into_iter()
                    .map(|p| PackageDto::from_model(p, storage))
                    .collect();
                context! { packages, filter, flash }
            }
            PackageView::Create { categories, parlors } => {
                context! { categories, parlors, flash }
            }
            PackageView::Show { package } => {
                let package = PackageDto::from_model(package, storage);
                context! { package, flash }
            }
            PackageView::Edit {
                package,
                categories,
                parlors,
            } => {
                let package = PackageDto::from_model(package, storage);
                context! { package, categories, parlors, flash }
            }
        }
    }
}
