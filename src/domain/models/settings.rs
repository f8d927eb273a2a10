use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "qwen-qwq-32b";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Respond in fluent Japanese";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
/// Value shipped in sample configuration files; never a real key.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GROQ_API_KEY_HERE_OR_LEAVE_BLANK_TO_USE_ENV_VAR";

/// Named request category selecting a configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Purpose(String);

impl Purpose {
    pub const MAIN_CHAT: &'static str = "main_chat";
    pub const EXPAND_PROMPT: &'static str = "expand_prompt";
    pub const GENERATE_METAPROMPT: &'static str = "generate_metaprompt";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn main_chat() -> Self {
        Self::new(Self::MAIN_CHAT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_main_chat(&self) -> bool {
        self.0 == Self::MAIN_CHAT
    }

    pub fn is_expand_prompt(&self) -> bool {
        self.0 == Self::EXPAND_PROMPT
    }
}

impl Default for Purpose {
    fn default() -> Self {
        Self::main_chat()
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output mode for models that can emit a reasoning channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningFormat {
    #[default]
    Parsed,
    Raw,
    Hidden,
}

impl ReasoningFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningFormat::Parsed => "parsed",
            ReasoningFormat::Raw => "raw",
            ReasoningFormat::Hidden => "hidden",
        }
    }
}

impl FromStr for ReasoningFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parsed" => Ok(ReasoningFormat::Parsed),
            "raw" => Ok(ReasoningFormat::Raw),
            "hidden" => Ok(ReasoningFormat::Hidden),
            other => Err(format!("unsupported reasoning format '{other}'")),
        }
    }
}

impl fmt::Display for ReasoningFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    0.6
}

fn default_max_completion_tokens() -> u32 {
    8192
}

fn default_top_p() -> f64 {
    0.95
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_reasoning_format() -> String {
    ReasoningFormat::Parsed.as_str().to_string()
}

fn default_reasoning_models() -> Vec<String> {
    vec![
        "qwen-qwq-32b".to_string(),
        "deepseek-r1-distill-llama-70b".to_string(),
    ]
}

/// One purpose section of the settings document.
///
/// Every field carries a default so a sparse section never fails to load.
/// `reasoning_format` is kept as the raw configured text; it is checked
/// against [`ReasoningFormat`] only when a request actually asks for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeSettings {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub stream: bool,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_reasoning_format")]
    pub reasoning_format: String,
    #[serde(default = "default_reasoning_models")]
    pub reasoning_supported_models: Vec<String>,
    #[serde(default)]
    pub available_models: Vec<String>,
}

impl Default for PurposeSettings {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            temperature: default_temperature(),
            max_completion_tokens: default_max_completion_tokens(),
            top_p: default_top_p(),
            stream: false,
            system_prompt: default_system_prompt(),
            reasoning_format: default_reasoning_format(),
            reasoning_supported_models: default_reasoning_models(),
            available_models: Vec::new(),
        }
    }
}

impl PurposeSettings {
    pub fn supports_reasoning(&self, model: &str) -> bool {
        self.reasoning_supported_models.iter().any(|m| m == model)
    }

    /// Models a client may pick from; the configured model when none are listed.
    pub fn selectable_models(&self) -> Vec<String> {
        if self.available_models.is_empty() {
            vec![self.model_name.clone()]
        } else {
            self.available_models.clone()
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Connection details for the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    /// The configured key, unless it is blank or the sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        usable_key(&self.api_key)
    }
}

pub fn usable_key(key: &str) -> Option<&str> {
    let key = key.trim();
    if key.is_empty() || key == API_KEY_PLACEHOLDER {
        None
    } else {
        Some(key)
    }
}

/// The loaded settings document: purpose sections plus provider details.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    purposes: HashMap<String, PurposeSettings>,
    provider: ProviderSettings,
}

impl Settings {
    pub fn new(purposes: HashMap<String, PurposeSettings>, provider: ProviderSettings) -> Self {
        Self { purposes, provider }
    }

    pub fn purpose(&self, name: &str) -> Option<&PurposeSettings> {
        self.purposes.get(name)
    }

    pub fn main_chat(&self) -> Option<&PurposeSettings> {
        self.purpose(Purpose::MAIN_CHAT)
    }

    pub fn provider(&self) -> &ProviderSettings {
        &self.provider
    }

    pub fn purpose_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.purposes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
