use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::packages::models::{Package, PackageFields, PackageFilter, PackageSortField};

const PACKAGE_COLUMNS: &str =
    "id, name, image, is_popular, category_id, parlor_id, created_at, updated_at";

/// Persistence for packages
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Every package matching the filter, in the filter's order
    async fn all(&self, filter: &PackageFilter) -> Result<Vec<Package>>;

    /// Look up by id; absence is `Ok(None)`, not an error
    async fn find(&self, id: i64) -> Result<Option<Package>>;

    async fn create(&self, fields: PackageFields) -> Result<Package>;

    async fn update(&self, id: i64, fields: PackageFields) -> Result<Package>;

    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct PgPackageStore {
    pool: PgPool,
}

impl PgPackageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn build_list_query(filter: &PackageFilter) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM packages WHERE TRUE",
            PACKAGE_COLUMNS
        ));

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(search)));
        }
        if let Some(category_id) = filter.category_id {
            query.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(parlor_id) = filter.parlor_id {
            query.push(" AND parlor_id = ").push_bind(parlor_id);
        }
        if let Some(is_popular) = filter.is_popular {
            query.push(" AND is_popular = ").push_bind(is_popular);
        }

        // Column and direction come from closed enums, never from raw input
        query
            .push(" ORDER BY ")
            .push(filter.order_by.column())
            .push(" ")
            .push(filter.sorted_by.as_sql());
        if filter.order_by != PackageSortField::Id {
            query.push(", id ASC");
        }

        query
    }
}

/// Escape LIKE wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl PackageStore for PgPackageStore {
    async fn all(&self, filter: &PackageFilter) -> Result<Vec<Package>> {
        let mut query = Self::build_list_query(filter);
        query
            .build_query_as::<Package>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list packages: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find(&self, id: i64) -> Result<Option<Package>> {
        sqlx::query_as::<_, Package>(&format!(
            "SELECT {} FROM packages WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find package {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn create(&self, fields: PackageFields) -> Result<Package> {
        sqlx::query_as::<_, Package>(&format!(
            r#"
            INSERT INTO packages (name, image, is_popular, category_id, parlor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(fields.name)
        .bind(fields.image)
        .bind(fields.is_popular)
        .bind(fields.category_id)
        .bind(fields.parlor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create package: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: i64, fields: PackageFields) -> Result<Package> {
        sqlx::query_as::<_, Package>(&format!(
            r#"
            UPDATE packages
            SET name = $1, image = $2, is_popular = $3, category_id = $4, parlor_id = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(fields.name)
        .bind(fields.image)
        .bind(fields.is_popular)
        .bind(fields.category_id)
        .bind(fields.parlor_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update package {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete package {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
