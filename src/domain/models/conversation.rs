use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Purpose;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One typed part of a multi-part message.
///
/// Part types other than text and image references deserialize to
/// [`ContentPart::Unsupported`] and are filtered out before forwarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    #[serde(other)]
    Unsupported,
}

impl ContentPart {
    pub fn is_supported(&self) -> bool {
        !matches!(self, ContentPart::Unsupported)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    /// Anything else the client sent; never forwarded.
    Other(Value),
}

impl MessageContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Parts(_) => "parts",
            MessageContent::Other(Value::Null) => "null",
            MessageContent::Other(Value::Bool(_)) => "boolean",
            MessageContent::Other(Value::Number(_)) => "number",
            MessageContent::Other(Value::Object(_)) => "object",
            MessageContent::Other(_) => "unsupported",
        }
    }
}

/// A single conversation turn. Role values are passed through unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: MessageContent,
}

impl ConversationTurn {
    pub fn new(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new("system", MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new("assistant", MessageContent::Text(text.into()))
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// Inbound chat operation payload.
///
/// Overrides are `Option`s: presence, not truthiness, decides whether they
/// apply, so an explicit `0` still counts as provided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ConversationTurn>,
    #[serde(default, deserialize_with = "purpose_or_default")]
    pub purpose: Purpose,
    #[serde(default, alias = "model")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default, alias = "max_completion_tokens")]
    pub max_tokens: Option<u32>,
}

/// `null` and absence both mean `main_chat`.
fn purpose_or_default<'de, D>(deserializer: D) -> Result<Purpose, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Purpose>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatRequest {
    pub fn new(messages: Vec<ConversationTurn>) -> Self {
        Self {
            messages,
            purpose: Purpose::default(),
            model_name: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Purpose::new(purpose);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}
