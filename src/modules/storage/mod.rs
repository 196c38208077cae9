//! Storage module for uploaded package images
//!
//! Both backends hand back a path reference that is saved on the record,
//! and can turn that reference into a URL for the views.

mod local;
mod minio_client;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;

pub use local::LocalStorage;
pub use minio_client::MinIOClient;

/// A file received from a form, already read into memory
#[derive(Debug)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Extension for the stored copy, preferring the declared content type
    pub fn extension(&self) -> String {
        extension_from_content_type(&self.content_type)
            .map(str::to_string)
            .or_else(|| {
                self.original_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty())
            })
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Random name for the stored copy, keeping only the extension
    pub fn generate_file_name(&self) -> String {
        format!("{}.{}", Uuid::new_v4(), self.extension())
    }
}

fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Persists uploads and resolves stored references to URLs
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store the file and return the path reference to save on the record
    async fn store(&self, file: UploadedFile) -> Result<String>;

    /// URL a browser can load the stored file from, if this backend serves it
    fn url(&self, path: &str) -> Option<String>;
}
