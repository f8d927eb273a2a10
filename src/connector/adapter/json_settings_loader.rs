use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::{DomainError, ProviderSettings, PurposeSettings, Settings};

const PROVIDER_KEY: &str = "provider";
/// Flat key accepted for older single-section files.
const LEGACY_API_KEY: &str = "api_key";

/// Reads the JSON settings document.
///
/// ```json
/// {
///   "provider": { "base_url": "https://api.groq.com/openai", "api_key": "" },
///   "main_chat": { "model_name": "qwen-qwq-32b", "temperature": 0.6 },
///   "expand_prompt": { "system_prompt": "Rewrite the prompt in more detail." }
/// }
/// ```
///
/// A missing file, unreadable file or invalid JSON is an error; the caller
/// treats it as fatal. Individual purpose sections that fail to decode are
/// dropped with a warning so lookups fall back to `main_chat`.
pub struct JsonSettingsLoader;

impl JsonSettingsLoader {
    pub fn load(path: &Path) -> Result<Settings, DomainError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "cannot read settings file {}: {e}",
                path.display()
            ))
        })?;

        let settings = Self::parse(&raw).map_err(|e| match e {
            DomainError::Configuration(msg) => {
                DomainError::configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        info!(
            "Loaded settings from {} (purposes: {})",
            path.display(),
            settings.purpose_names().join(", ")
        );
        Ok(settings)
    }

    pub fn parse(raw: &str) -> Result<Settings, DomainError> {
        let document: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| DomainError::configuration(format!("invalid settings JSON: {e}")))?;

        let mut provider = ProviderSettings::default();
        let mut legacy_key: Option<String> = None;
        let mut purposes = HashMap::new();

        for (name, value) in document {
            if name == PROVIDER_KEY {
                provider = serde_json::from_value(value).map_err(|e| {
                    DomainError::configuration(format!("invalid '{PROVIDER_KEY}' section: {e}"))
                })?;
                continue;
            }

            if name == LEGACY_API_KEY {
                legacy_key = value.as_str().map(str::to_string);
                continue;
            }

            if !value.is_object() {
                warn!("Ignoring settings key '{}': not a purpose section", name);
                continue;
            }

            match serde_json::from_value::<PurposeSettings>(value) {
                Ok(section) => {
                    purposes.insert(name, section);
                }
                Err(e) => warn!("Dropping malformed settings section '{}': {}", name, e),
            }
        }

        if provider.api_key.is_empty() {
            if let Some(key) = legacy_key {
                provider.api_key = key;
            }
        }

        Ok(Settings::new(purposes, provider))
    }
}
