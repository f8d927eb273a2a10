use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ConversationTurn, ReasoningFormat};

/// Resolved parameters for one outbound completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParameters {
    pub model: String,
    pub temperature: f64,
    pub max_completion_tokens: u32,
    pub top_p: f64,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_format: Option<ReasoningFormat>,
}

/// The outbound request body: assembled messages plus flattened parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    #[serde(flatten)]
    pub parameters: CompletionParameters,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ConversationTurn>, parameters: CompletionParameters) -> Self {
        Self {
            messages,
            parameters,
        }
    }

    pub fn model(&self) -> &str {
        &self.parameters.model
    }
}

/// The reasoning/plan/criticism triple some providers nest under `thoughts`.
///
/// Values are kept as raw JSON because providers disagree on whether a plan
/// is a string or a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thoughts {
    #[serde(default)]
    pub reasoning: Option<Value>,
    #[serde(default)]
    pub plan: Option<Value>,
    #[serde(default)]
    pub criticism: Option<Value>,
}

impl Thoughts {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.plan.is_none() && self.criticism.is_none()
    }
}

/// The mutually exclusive shapes of a reply's `reasoning` field.
///
/// Tried in declaration order: a mapping carrying a `thoughts` sub-mapping,
/// an object exposing the three sub-fields directly, then plain text. Any
/// other JSON lands in `Unrecognized` so decoding the reply never fails on it.
///
/// A `Nested` mapping also keeps any sub-fields sitting beside `thoughts`,
/// used when `thoughts` itself turns out empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReasoningField {
    Nested {
        thoughts: Thoughts,
        #[serde(flatten)]
        direct: Thoughts,
    },
    Flat(Thoughts),
    Text(String),
    Unrecognized(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<ReasoningField>,
    #[serde(default)]
    pub tool_calls: Option<Vec<Value>>,
    #[serde(default)]
    pub executed_tools: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: ReplyMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The provider's raw completion reply, decoded leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionReply {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ReplyChoice>,
    #[serde(default)]
    pub usage: Option<Value>,
}

impl CompletionReply {
    /// A single-choice reply carrying `message`.
    pub fn from_message(message: ReplyMessage) -> Self {
        Self {
            choices: vec![ReplyChoice {
                index: 0,
                message,
                finish_reason: Some("stop".to_string()),
            }],
            ..Self::default()
        }
    }

    pub fn first_message(&self) -> Option<&ReplyMessage> {
        self.choices.first().map(|c| &c.message)
    }
}
