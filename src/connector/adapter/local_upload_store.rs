use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::domain::DomainError;

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name shown to the user (the client's original file name).
    pub display_name: String,
    /// Absolute path of the stored copy.
    pub path: PathBuf,
}

/// Stores uploaded files under one directory with collision-free names.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload, DomainError> {
        let display_name = base_name(original_name);
        if display_name.is_empty() {
            return Err(DomainError::invalid_request("uploaded file has no usable name"));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = tokio::fs::canonicalize(&self.dir).await?;
        let path = dir.join(format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize(&display_name)
        ));

        tokio::fs::write(&path, bytes).await?;
        info!(
            "Stored upload '{}' ({} bytes) at {}",
            display_name,
            bytes.len(),
            path.display()
        );

        Ok(StoredUpload { display_name, path })
    }
}

/// Final path component of a client-supplied name.
fn base_name(original: &str) -> String {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
