use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::parlors::models::Parlor;

/// Read access to parlors
#[async_trait]
pub trait ParlorStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Parlor>>;
}

pub struct PgParlorStore {
    pool: PgPool,
}

impl PgParlorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParlorStore for PgParlorStore {
    async fn list_all(&self) -> Result<Vec<Parlor>> {
        sqlx::query_as::<_, Parlor>(
            "SELECT id, name, created_at, updated_at FROM parlors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list parlors: {:?}", e);
            AppError::Database(e)
        })
    }
}
