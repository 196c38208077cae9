use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::{CategoryStore, CategoryType};
use crate::features::packages::dtos::{PackageInput, PackageView};
use crate::features::packages::models::{Package, PackageFields, PackageFilter};
use crate::features::packages::stores::PackageStore;
use crate::features::parlors::ParlorStore;
use crate::modules::storage::{FileStorage, UploadedFile};
use crate::shared::flash::FlashRedirect;

/// Where every package redirect lands
pub const INDEX_ROUTE: &str = "/packages";

pub const PACKAGE_NOT_FOUND: &str = "Package not found";
pub const PACKAGE_SAVED: &str = "Package saved successfully.";
pub const PACKAGE_UPDATED: &str = "Package updated successfully.";
pub const PACKAGE_DELETED: &str = "Package deleted successfully.";

/// Result of an operation that may bounce back to the list
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    View(PackageView),
    Redirect(FlashRedirect),
}

/// Service for package CRUD
pub struct PackageService {
    packages: Arc<dyn PackageStore>,
    categories: Arc<dyn CategoryStore>,
    parlors: Arc<dyn ParlorStore>,
    storage: Arc<dyn FileStorage>,
}

impl PackageService {
    pub fn new(
        packages: Arc<dyn PackageStore>,
        categories: Arc<dyn CategoryStore>,
        parlors: Arc<dyn ParlorStore>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            packages,
            categories,
            parlors,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }

    /// Every package matching the filter
    pub async fn list(&self, filter: &PackageFilter) -> Result<PackageView> {
        let packages = self.packages.all(filter).await?;
        tracing::debug!("Listing {} packages", packages.len());

        Ok(PackageView::Index {
            packages,
            filter: filter.clone(),
        })
    }

    /// Empty create form with its reference lists
    pub async fn new_form(&self) -> Result<PackageView> {
        let categories = self.categories.list_by_type(CategoryType::Service).await?;
        let parlors = self.parlors.list_all().await?;

        Ok(PackageView::Create {
            categories,
            parlors,
        })
    }

    pub async fn create(&self, mut input: PackageInput) -> Result<FlashRedirect> {
        let image = self.store_image(input.image.take()).await?;
        let package = self.packages.create(fields_from(input, image)).await?;

        tracing::info!("Created package {} ({})", package.id, package.name);
        Ok(FlashRedirect::success(INDEX_ROUTE, PACKAGE_SAVED))
    }

    pub async fn show(&self, id: i64) -> Result<Outcome> {
        let Some(package) = self.find(id).await? else {
            return Ok(Outcome::Redirect(not_found()));
        };

        Ok(Outcome::View(PackageView::Show { package }))
    }

    pub async fn edit_form(&self, id: i64) -> Result<Outcome> {
        let Some(package) = self.find(id).await? else {
            return Ok(Outcome::Redirect(not_found()));
        };

        let categories = self.categories.list_by_type(CategoryType::Service).await?;
        let parlors = self.parlors.list_all().await?;

        Ok(Outcome::View(PackageView::Edit {
            package,
            categories,
            parlors,
        }))
    }

    /// Replace the package's fields. Without a new upload the stored image is kept as is.
    pub async fn update(&self, id: i64, mut input: PackageInput) -> Result<FlashRedirect> {
        let Some(existing) = self.find(id).await? else {
            return Ok(not_found());
        };

        let image = match self.store_image(input.image.take()).await? {
            Some(path) => Some(path),
            None => existing.image,
        };
        self.packages.update(id, fields_from(input, image)).await?;

        tracing::info!("Updated package {}", id);
        Ok(FlashRedirect::success(INDEX_ROUTE, PACKAGE_UPDATED))
    }

    pub async fn delete(&self, id: i64) -> Result<FlashRedirect> {
        if self.find(id).await?.is_none() {
            return Ok(not_found());
        }

        self.packages.delete(id).await?;

        tracing::info!("Deleted package {}", id);
        Ok(FlashRedirect::success(INDEX_ROUTE, PACKAGE_DELETED))
    }

    async fn find(&self, id: i64) -> Result<Option<Package>> {
        let package = self.packages.find(id).await?;
        if package.is_none() {
            tracing::warn!("Package {} not found", id);
        }
        Ok(package)
    }

    async fn store_image(&self, image: Option<UploadedFile>) -> Result<Option<String>> {
        match image {
            Some(file) => {
                let path = self.storage.store(file).await?;
                tracing::debug!("Stored package image at {}", path);
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

fn not_found() -> FlashRedirect {
    FlashRedirect::error(INDEX_ROUTE, PACKAGE_NOT_FOUND)
}

fn fields_from(input: PackageInput, image: Option<String>) -> PackageFields {
    PackageFields {
        name: input.name,
        image,
        is_popular: input.is_popular.is_some(),
        category_id: input.category_id,
        parlor_id: input.parlor_id,
    }
}
