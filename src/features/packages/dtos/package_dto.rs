use axum::extract::{
    multipart::{Field, MultipartError},
    Multipart,
};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::packages::models::{Package, PackageFilter, PackageSortField};
use crate::modules::storage::{FileStorage, UploadedFile};
use crate::shared::types::{empty_string_as_none, SortDirection};

/// Allowed MIME types for package images
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum image size in bytes (10MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Query params for the package list
#[derive(Debug, Default, Deserialize)]
pub struct ListPackagesQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub parlor_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_popular: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_by: Option<PackageSortField>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sorted_by: Option<SortDirection>,
}

impl From<ListPackagesQuery> for PackageFilter {
    fn from(q: ListPackagesQuery) -> Self {
        Self {
            search: q.search.filter(|s| !s.trim().is_empty()),
            category_id: q.category_id,
            parlor_id: q.parlor_id,
            is_popular: q.is_popular,
            order_by: q.order_by.unwrap_or_default(),
            sorted_by: q.sorted_by.unwrap_or_default(),
        }
    }
}

/// Raw create/update form as read from `multipart/form-data`
#[derive(Debug, Default, Validate)]
pub struct PackageForm {
    #[validate(
        required(message = "The name field is required."),
        length(min = 1, max = 255, message = "The name must be 1-255 characters.")
    )]
    pub name: Option<String>,

    #[validate(required(message = "The category field is required."))]
    pub category_id: Option<i64>,

    #[validate(required(message = "The parlor field is required."))]
    pub parlor_id: Option<i64>,

    /// Checkbox: only its presence matters
    pub is_popular: Option<String>,

    pub image: Option<UploadedFile>,
}

/// Validated input handed to the package service
#[derive(Debug)]
pub struct PackageInput {
    pub name: String,
    pub category_id: i64,
    pub parlor_id: i64,
    /// Raw checkbox value; `Some` with any content means popular
    pub is_popular: Option<String>,
    /// Newly uploaded image, if a file was chosen
    pub image: Option<UploadedFile>,
}

impl PackageForm {
    /// Read every known field from the multipart body. Unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = PackageForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("multipart data", e))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "image" => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let original_name = field.file_name().unwrap_or("").to_string();

                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("image data", e))?;

                    // Browsers send an empty part when no file was chosen
                    if original_name.is_empty() && data.is_empty() {
                        continue;
                    }

                    form.image = Some(UploadedFile {
                        original_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
                "name" => {
                    let text = read_text(field, &field_name).await?;
                    form.name = Some(text.trim().to_string()).filter(|s| !s.is_empty());
                }
                "category_id" => {
                    let text = read_text(field, &field_name).await?;
                    form.category_id = parse_id(&field_name, &text)?;
                }
                "parlor_id" => {
                    let text = read_text(field, &field_name).await?;
                    form.parlor_id = parse_id(&field_name, &text)?;
                }
                "is_popular" => {
                    form.is_popular = Some(read_text(field, &field_name).await?);
                }
                _ => {
                    debug!("Ignoring unknown field: {}", field_name);
                }
            }
        }

        Ok(form)
    }

    /// Validate and convert into service input
    pub fn into_input(self) -> Result<PackageInput> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(image) = &self.image {
            validate_image(image)?;
        }

        match (self.name, self.category_id, self.parlor_id) {
            (Some(name), Some(category_id), Some(parlor_id)) => Ok(PackageInput {
                name,
                category_id,
                parlor_id,
                is_popular: self.is_popular,
                image: self.image,
            }),
            _ => Err(AppError::Validation(
                "name, category_id and parlor_id are required".to_string(),
            )),
        }
    }
}

async fn read_text(field: Field<'_>, field_name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| multipart_error(&format!("{} field", field_name), e))
}

/// Body over the request limit is a 413, anything else a malformed upload
fn multipart_error(what: &str, e: MultipartError) -> AppError {
    debug!("Failed to read {}: {}", what, e);
    let message = format!("Failed to read {}: {}", what, e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

fn parse_id(field_name: &str, text: &str) -> Result<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("The {} must be a number.", field_name)))
}

fn validate_image(image: &UploadedFile) -> Result<()> {
    if image.data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::Validation(format!(
            "Image too large. Maximum size is {} MB",
            MAX_IMAGE_SIZE / 1024 / 1024
        )));
    }

    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Image type '{}' is not allowed. Allowed types: {}",
            image.content_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }

    Ok(())
}

/// Package as shown in the views
#[derive(Debug, Clone, Serialize)]
pub struct PackageDto {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub is_popular: bool,
    pub category_id: i64,
    pub parlor_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PackageDto {
    pub fn from_model(p: Package, storage: &dyn FileStorage) -> Self {
        Self {
            id: p.id,
            image_url: p
                .image
                .as_deref()
                .filter(|path| !path.is_empty())
                .and_then(|path| storage.url(path)),
            image: p.image,
            name: p.name,
            is_popular: p.is_popular,
            category_id: p.category_id,
            parlor_id: p.parlor_id,
            created_at: p.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: p.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
