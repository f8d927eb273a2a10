use std::sync::Arc;

use tracing::warn;

use crate::domain::{DomainError, Purpose, PurposeSettings, Settings};

/// Picks the settings section governing a request's purpose.
#[derive(Clone)]
pub struct SettingsResolver {
    settings: Arc<Settings>,
}

impl SettingsResolver {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Look up `purpose`, substituting `main_chat` when the section is absent.
    ///
    /// Fails with a configuration error only when `main_chat` itself is
    /// unavailable.
    pub fn resolve(&self, purpose: &Purpose) -> Result<&PurposeSettings, DomainError> {
        if let Some(section) = self.settings.purpose(purpose.as_str()) {
            return Ok(section);
        }

        if !purpose.is_main_chat() {
            warn!(
                "No settings section for purpose '{}', falling back to '{}'",
                purpose,
                Purpose::MAIN_CHAT
            );
        }

        self.settings.main_chat().ok_or_else(|| {
            DomainError::configuration(format!(
                "settings section '{}' is missing or malformed",
                Purpose::MAIN_CHAT
            ))
        })
    }

    /// Models the client may choose from for the main chat.
    pub fn selectable_models(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.resolve(&Purpose::main_chat())?.selectable_models())
    }
}
