use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{CleanupController, ModelsController};

pub struct Router<'a> {
    models_controller: ModelsController<'a>,
    cleanup_controller: CleanupController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            models_controller: ModelsController::new(container),
            cleanup_controller: CleanupController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Models => self.models_controller.list().await,
            Commands::Cleanup { max_age_hours } => {
                self.cleanup_controller.cleanup(max_age_hours).await
            }
            Commands::Serve { .. } => unreachable!("serve is handled separately in main"),
        }
    }
}
