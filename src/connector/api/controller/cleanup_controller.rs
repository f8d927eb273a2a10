use std::time::Duration;

use anyhow::Result;

use super::super::Container;

pub struct CleanupController<'a> {
    container: &'a Container,
}

impl<'a> CleanupController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn cleanup(&self, max_age_hours: u64) -> Result<String> {
        let max_age = Duration::from_secs(max_age_hours * 3600);
        let removed = self.container.cleanup_use_case(max_age).execute().await?;

        Ok(format!(
            "Removed {} upload(s) older than {}h from {}",
            removed,
            max_age_hours,
            self.container.upload_dir().display()
        ))
    }
}
