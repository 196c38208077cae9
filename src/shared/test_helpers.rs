//! In-memory collaborators for service and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use fake::{faker::company::en::CompanyName, faker::lorem::en::Word, Fake};

use crate::core::error::{AppError, Result};
use crate::features::categories::{Category, CategoryStore, CategoryType};
use crate::features::packages::models::{Package, PackageFields, PackageFilter, PackageSortField};
use crate::features::packages::stores::PackageStore;
use crate::features::packages::PackageService;
use crate::features::parlors::{Parlor, ParlorStore};
use crate::modules::storage::{FileStorage, UploadedFile};
use crate::shared::types::SortDirection;

pub fn package_fixture(id: i64) -> Package {
    let created_at = Utc::now() - Duration::minutes(100 - id);
    Package {
        id,
        name: format!("{} {}", Word().fake::<String>(), id),
        image: None,
        is_popular: false,
        category_id: 1,
        parlor_id: 1,
        created_at,
        updated_at: created_at,
    }
}

pub fn category_fixture(id: i64, category_type: CategoryType) -> Category {
    Category {
        id,
        name: Word().fake(),
        category_type: category_type.as_str().to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn parlor_fixture(id: i64) -> Parlor {
    Parlor {
        id,
        name: CompanyName().fake(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn png_upload() -> UploadedFile {
    UploadedFile {
        original_name: "photo.png".to_string(),
        content_type: "image/png".to_string(),
        data: vec![0x89, b'P', b'N', b'G'],
    }
}

/// Package store backed by a `Vec`, counting every mutation
#[derive(Default)]
pub struct InMemoryPackageStore {
    packages: Mutex<Vec<Package>>,
    mutations: AtomicUsize,
}

impl InMemoryPackageStore {
    pub fn with_packages(packages: Vec<Package>) -> Self {
        Self {
            packages: Mutex::new(packages),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Package> {
        self.packages.lock().unwrap().clone()
    }

    pub fn get(&self, id: i64) -> Option<Package> {
        self.snapshot().into_iter().find(|p| p.id == id)
    }

    fn matches(package: &Package, filter: &PackageFilter) -> bool {
        let search_ok = filter.search.as_deref().is_none_or(|s| {
            package
                .name
                .to_lowercase()
                .contains(&s.trim().to_lowercase())
        });
        search_ok
            && filter.category_id.is_none_or(|id| package.category_id == id)
            && filter.parlor_id.is_none_or(|id| package.parlor_id == id)
            && filter.is_popular.is_none_or(|p| package.is_popular == p)
    }
}

#[async_trait]
impl PackageStore for InMemoryPackageStore {
    async fn all(&self, filter: &PackageFilter) -> Result<Vec<Package>> {
        let mut packages: Vec<Package> = self
            .snapshot()
            .into_iter()
            .filter(|p| Self::matches(p, filter))
            .collect();

        packages.sort_by(|a, b| {
            let ordering = match filter.order_by {
                PackageSortField::Id => a.id.cmp(&b.id),
                PackageSortField::Name => a.name.cmp(&b.name),
                PackageSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match filter.sorted_by {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
            .then(a.id.cmp(&b.id))
        });

        Ok(packages)
    }

    async fn find(&self, id: i64) -> Result<Option<Package>> {
        Ok(self.get(id))
    }

    async fn create(&self, fields: PackageFields) -> Result<Package> {
        let mut packages = self.packages.lock().unwrap();
        let id = packages.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let package = Package {
            id,
            name: fields.name,
            image: fields.image,
            is_popular: fields.is_popular,
            category_id: fields.category_id,
            parlor_id: fields.parlor_id,
            created_at: now,
            updated_at: now,
        };
        packages.push(package.clone());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(package)
    }

    async fn update(&self, id: i64, fields: PackageFields) -> Result<Package> {
        let mut packages = self.packages.lock().unwrap();
        let package = packages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::Database(sqlx::Error::RowNotFound))?;
        package.name = fields.name;
        package.image = fields.image;
        package.is_popular = fields.is_popular;
        package.category_id = fields.category_id;
        package.parlor_id = fields.parlor_id;
        package.updated_at = Utc::now();
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(package.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.packages.lock().unwrap().retain(|p| p.id != id);
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct InMemoryCategoryStore {
    categories: Vec<Category>,
}

impl InMemoryCategoryStore {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn list_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>> {
        Ok(self
            .categories
            .iter()
            .filter(|c| c.category_type == category_type.as_str())
            .cloned()
            .collect())
    }
}

pub struct InMemoryParlorStore {
    parlors: Vec<Parlor>,
}

impl InMemoryParlorStore {
    pub fn new(parlors: Vec<Parlor>) -> Self {
        Self { parlors }
    }
}

#[async_trait]
impl ParlorStore for InMemoryParlorStore {
    async fn list_all(&self) -> Result<Vec<Parlor>> {
        Ok(self.parlors.clone())
    }
}

/// File storage that keeps uploads in memory and hands back `uploads/<n>.<ext>`
#[derive(Default)]
pub struct RecordingStorage {
    stored: Mutex<Vec<(String, UploadedFile)>>,
}

impl RecordingStorage {
    pub fn stored_paths(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Bytes of every stored upload, in store order
    pub fn stored_data(&self) -> Vec<Vec<u8>> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(_, file)| file.data.clone())
            .collect()
    }
}

#[async_trait]
impl FileStorage for RecordingStorage {
    async fn store(&self, file: UploadedFile) -> Result<String> {
        let mut stored = self.stored.lock().unwrap();
        let path = format!("uploads/{}.{}", stored.len() + 1, file.extension());
        stored.push((path.clone(), file));
        Ok(path)
    }

    fn url(&self, path: &str) -> Option<String> {
        Some(format!("/storage/{}", path))
    }
}

/// Everything a package test needs, sharing the same collaborators as the service
pub struct TestHarness {
    pub packages: Arc<InMemoryPackageStore>,
    pub storage: Arc<RecordingStorage>,
    pub service: Arc<PackageService>,
}

impl TestHarness {
    pub fn new(packages: Vec<Package>) -> Self {
        let packages = Arc::new(InMemoryPackageStore::with_packages(packages));
        let storage = Arc::new(RecordingStorage::default());
        let categories = Arc::new(InMemoryCategoryStore::new(vec![
            category_fixture(1, CategoryType::Service),
            category_fixture(2, CategoryType::Service),
            category_fixture(3, CategoryType::Product),
        ]));
        let parlors = Arc::new(InMemoryParlorStore::new(vec![
            parlor_fixture(1),
            parlor_fixture(2),
        ]));

        let service = Arc::new(PackageService::new(
            packages.clone(),
            categories,
            parlors,
            storage.clone(),
        ));

        Self {
            packages,
            storage,
            service,
        }
    }
}
