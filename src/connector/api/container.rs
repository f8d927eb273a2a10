use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::application::{
    AttachmentInliner, ChatCompletionUseCase, CleanupUploadsUseCase, CompletionProvider,
    SettingsResolver,
};
use crate::domain::{DomainError, Settings};
use crate::{GroqClient, JsonSettingsLoader, LocalUploadStore, MockCompletionProvider};

pub struct ContainerConfig {
    pub config_path: PathBuf,
    pub upload_dir: PathBuf,
    /// Serve from the offline echo provider instead of Groq.
    pub mock_provider: bool,
}

/// Process-wide context, built once at startup and shared read-only.
pub struct Container {
    settings: Arc<Settings>,
    provider: Option<Arc<dyn CompletionProvider>>,
    upload_dir: PathBuf,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let settings = JsonSettingsLoader::load(&config.config_path)?;

        let provider: Option<Arc<dyn CompletionProvider>> = if config.mock_provider {
            debug!("Using mock completion provider");
            Some(Arc::new(MockCompletionProvider::new()))
        } else {
            match GroqClient::from_settings(settings.provider()) {
                Some(client) => {
                    debug!("Groq client targeting {}", client.url());
                    Some(Arc::new(client))
                }
                None => {
                    warn!(
                        "No Groq API key configured (GROQ_API_KEY or provider.api_key). \
                         Chat requests will fail until one is provided."
                    );
                    None
                }
            }
        };

        Self::assemble(settings, provider, &config.upload_dir).await
    }

    /// Same as [`Container::new`] but with an explicit provider (or none).
    pub async fn with_provider(
        config: ContainerConfig,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<Self> {
        let settings = JsonSettingsLoader::load(&config.config_path)?;
        Self::assemble(settings, provider, &config.upload_dir).await
    }

    async fn assemble(
        settings: Settings,
        provider: Option<Arc<dyn CompletionProvider>>,
        upload_dir: &Path,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(upload_dir)
            .await
            .with_context(|| format!("creating upload directory {}", upload_dir.display()))?;
        let upload_dir = tokio::fs::canonicalize(upload_dir).await?;

        info!(
            "Container ready: provider={}, uploads={}",
            provider.as_ref().map(|p| p.name()).unwrap_or("none"),
            upload_dir.display()
        );

        Ok(Self {
            settings: Arc::new(settings),
            provider,
            upload_dir,
        })
    }

    pub fn chat_use_case(&self) -> Result<ChatCompletionUseCase, DomainError> {
        let provider = self.provider.clone().ok_or_else(|| {
            DomainError::authentication("no provider API key is configured")
        })?;
        Ok(ChatCompletionUseCase::new(
            Arc::clone(&self.settings),
            provider,
            self.inliner(),
        ))
    }

    pub fn settings_resolver(&self) -> SettingsResolver {
        SettingsResolver::new(Arc::clone(&self.settings))
    }

    pub fn cleanup_use_case(&self, max_age: Duration) -> CleanupUploadsUseCase {
        CleanupUploadsUseCase::new(&self.upload_dir, max_age)
    }

    pub fn upload_store(&self) -> LocalUploadStore {
        LocalUploadStore::new(&self.upload_dir)
    }

    pub fn inliner(&self) -> AttachmentInliner {
        AttachmentInliner::new(&self.upload_dir)
    }

    pub fn provider_ready(&self) -> bool {
        self.provider.is_some()
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
