use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::DomainError;

/// Deletes uploaded files older than a maximum age.
///
/// Housekeeping only: nothing in the chat path depends on it running.
pub struct CleanupUploadsUseCase {
    upload_dir: PathBuf,
    max_age: Duration,
}

impl CleanupUploadsUseCase {
    pub fn new(upload_dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_age,
        }
    }

    /// Returns the number of files removed.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        if !self.upload_dir.is_dir() {
            debug!(
                "Upload directory {} does not exist, nothing to clean",
                self.upload_dir.display()
            );
            return Ok(0);
        }

        let now = SystemTime::now();
        let expired: Vec<PathBuf> = WalkDir::new(&self.upload_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > self.max_age)
            })
            .map(|entry| entry.into_path())
            .collect();

        let mut removed = 0;
        for path in expired {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Removed expired upload {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!(
                "Removed {} uploads older than {}s from {}",
                removed,
                self.max_age.as_secs(),
                self.upload_dir.display()
            );
        }

        Ok(removed)
    }
}
