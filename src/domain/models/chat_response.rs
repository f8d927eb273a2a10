use serde::{Deserialize, Serialize};

fn default_tool_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(rename = "type", default = "default_tool_type")]
    pub call_type: String,
    pub function: ToolCallFunction,
}

/// A provider-side action (e.g. a web search) and what it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedTool {
    pub arguments: String,
    pub index: u32,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub output: Option<String>,
}

/// The fixed shape returned to the chat client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub reasoning: Option<String>,
    pub plan: Option<String>,
    pub criticism: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub executed_tools: Option<Vec<ExecutedTool>>,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn has_reasoning(&self) -> bool {
        self.reasoning.is_some() || self.plan.is_some() || self.criticism.is_some()
    }
}
