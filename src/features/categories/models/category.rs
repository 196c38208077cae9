use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// What a category groups: bookable services or retail products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Service,
    Product,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Service => "service",
            CategoryType::Product => "product",
        }
    }
}

/// Database model for category
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
