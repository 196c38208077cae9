use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::config::LocalStorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{FileStorage, UploadedFile};

/// Directory (and path prefix) that public uploads are written under
const PUBLIC_DIR: &str = "public";

/// Disk-backed storage. References look like `public/<uuid>.<ext>`.
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    /// Create the storage, making sure the public directory exists
    pub async fn new(config: LocalStorageConfig) -> Result<Self> {
        let storage = Self {
            root: config.root,
            public_url: config.public_url,
        };

        tokio::fs::create_dir_all(storage.public_dir())
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to create storage directory '{}': {}",
                    storage.public_dir().display(),
                    e
                ))
            })?;

        info!(
            "Local storage initialized at {} (served under {})",
            storage.public_dir().display(),
            storage.public_url
        );

        Ok(storage)
    }

    /// Directory to serve under the public URL
    pub fn public_dir(&self) -> PathBuf {
        self.root.join(PUBLIC_DIR)
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    fn absolute_path(&self, key: &str) -> PathBuf {
        self.root.join(Path::new(key))
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn store(&self, file: UploadedFile) -> Result<String> {
        let key = format!("{}/{}", PUBLIC_DIR, file.generate_file_name());
        let path = self.absolute_path(&key);

        tokio::fs::write(&path, &file.data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write '{}': {}", path.display(), e))
        })?;

        debug!(
            "Stored upload '{}' ({} bytes) as '{}'",
            file.original_name,
            file.data.len(),
            key
        );
        Ok(key)
    }

    fn url(&self, path: &str) -> Option<String> {
        // Only `public/` is exposed at `public_url`
        match path
            .strip_prefix(PUBLIC_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(relative) if !relative.is_empty() => {
                Some(format!("{}/{}", self.public_url, relative))
            }
            _ => {
                debug!("No public URL for stored reference '{}'", path);
                None
            }
        }
    }
}
