use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::shared::types::SortDirection;

/// Database model for package
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Package {
    pub id: i64,
    pub name: String,
    /// Storage path reference; `None` when no image was ever uploaded
    pub image: Option<String>,
    pub is_popular: bool,
    pub category_id: i64,
    pub parlor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on create and on update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFields {
    pub name: String,
    pub image: Option<String>,
    pub is_popular: bool,
    pub category_id: i64,
    pub parlor_id: i64,
}

/// Columns the package list can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageSortField {
    #[default]
    Id,
    Name,
    CreatedAt,
}

impl PackageSortField {
    pub fn column(&self) -> &'static str {
        match self {
            PackageSortField::Id => "id",
            PackageSortField::Name => "name",
            PackageSortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for PackageSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(PackageSortField::Id),
            "name" => Ok(PackageSortField::Name),
            "created_at" => Ok(PackageSortField::CreatedAt),
            other => Err(format!(
                "unknown sort field `{}`, expected `id`, `name` or `created_at`",
                other
            )),
        }
    }
}

/// Typed filter for listing packages. Unset fields do not narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageFilter {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub parlor_id: Option<i64>,
    pub is_popular: Option<bool>,
    pub order_by: PackageSortField,
    pub sorted_by: SortDirection,
}
