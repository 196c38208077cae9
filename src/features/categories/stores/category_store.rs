use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryType};

/// Read access to categories
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>>;
}

pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn list_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, category_type, created_at, updated_at
            FROM categories
            WHERE category_type = $1
            ORDER BY name
            "#,
        )
        .bind(category_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {} categories: {:?}", category_type.as_str(), e);
            AppError::Database(e)
        })
    }
}
