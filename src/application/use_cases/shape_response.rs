use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{
    ChatResponse, CompletionReply, DomainError, ExecutedTool, ReasoningField, Thoughts, ToolCall,
    ToolCallFunction,
};

/// Reasoning sub-fields pulled out of a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReasoning {
    pub reasoning: Option<String>,
    pub plan: Option<String>,
    pub criticism: Option<String>,
}

impl From<&Thoughts> for ExtractedReasoning {
    fn from(thoughts: &Thoughts) -> Self {
        Self {
            reasoning: thoughts.reasoning.as_ref().and_then(value_to_text),
            plan: thoughts.plan.as_ref().and_then(value_to_text),
            criticism: thoughts.criticism.as_ref().and_then(value_to_text),
        }
    }
}

/// Resolve whichever reasoning shape the provider sent, moving on to the
/// next shape when one decodes but carries nothing. Never fails; an
/// unrecognized shape yields no reasoning at all.
pub fn extract_reasoning(field: Option<&ReasoningField>) -> ExtractedReasoning {
    match field {
        Some(ReasoningField::Nested { thoughts, .. }) if !thoughts.is_empty() => thoughts.into(),
        Some(ReasoningField::Nested { direct, .. }) => direct.into(),
        Some(ReasoningField::Flat(thoughts)) => thoughts.into(),
        Some(ReasoningField::Text(text)) if !text.is_empty() => ExtractedReasoning {
            reasoning: Some(text.clone()),
            ..ExtractedReasoning::default()
        },
        Some(ReasoningField::Unrecognized(value)) => {
            warn!("Ignoring reasoning field of unexpected shape: {}", value);
            ExtractedReasoning::default()
        }
        _ => ExtractedReasoning::default(),
    }
}

#[derive(Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct RawToolCall {
    #[serde(rename = "type", default)]
    call_type: Option<String>,
    function: RawFunction,
}

#[derive(Deserialize)]
struct RawExecutedTool {
    #[serde(default)]
    arguments: Value,
    index: u32,
    #[serde(rename = "type")]
    tool_type: String,
    #[serde(default)]
    output: Option<Value>,
}

/// Turns the provider's raw reply into the fixed client shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseShaper;

impl ResponseShaper {
    pub fn new() -> Self {
        Self
    }

    pub fn shape(&self, reply: &CompletionReply) -> Result<ChatResponse, DomainError> {
        let message = reply
            .first_message()
            .ok_or_else(|| DomainError::provider("reply contained no completion choices"))?;

        let reasoning = extract_reasoning(message.reasoning.as_ref());

        let tool_calls = message
            .tool_calls
            .as_deref()
            .map(|raw| convert_each(raw, "tool call", to_tool_call))
            .filter(|calls| !calls.is_empty());

        let executed_tools = message
            .executed_tools
            .as_deref()
            .map(|raw| convert_each(raw, "executed tool", to_executed_tool))
            .filter(|tools| !tools.is_empty());

        Ok(ChatResponse {
            content: message.content.clone().unwrap_or_default(),
            reasoning: reasoning.reasoning,
            plan: reasoning.plan,
            criticism: reasoning.criticism,
            tool_calls,
            executed_tools,
        })
    }
}

fn convert_each<T>(
    raw: &[Value],
    label: &str,
    convert: fn(&Value) -> Result<T, serde_json::Error>,
) -> Vec<T> {
    raw.iter()
        .enumerate()
        .filter_map(|(i, value)| match convert(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Dropping {} #{}: {}", label, i, e);
                None
            }
        })
        .collect()
}

fn to_tool_call(value: &Value) -> Result<ToolCall, serde_json::Error> {
    let raw = RawToolCall::deserialize(value)?;
    Ok(ToolCall {
        call_type: raw.call_type.unwrap_or_else(|| "function".to_string()),
        function: ToolCallFunction {
            name: raw.function.name,
            arguments: value_to_text(&raw.function.arguments).unwrap_or_default(),
        },
    })
}

fn to_executed_tool(value: &Value) -> Result<ExecutedTool, serde_json::Error> {
    let raw = RawExecutedTool::deserialize(value)?;
    Ok(ExecutedTool {
        arguments: value_to_text(&raw.arguments).unwrap_or_default(),
        index: raw.index,
        tool_type: raw.tool_type,
        output: raw.output.as_ref().and_then(value_to_text),
    })
}

/// Strings pass through; other JSON is rendered as compact JSON text.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(message: Value) -> CompletionReply {
        serde_json::from_value(json!({"choices": [{"index": 0, "message": message}]})).unwrap()
    }

    #[test]
    fn plain_string_reasoning() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({"content": "Answer", "reasoning": "because X"})))
            .unwrap();

        assert_eq!(shaped.content, "Answer");
        assert_eq!(shaped.reasoning.as_deref(), Some("because X"));
        assert_eq!(shaped.plan, None);
        assert_eq!(shaped.criticism, None);
    }

    #[test]
    fn nested_thoughts_reasoning() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({
                "content": "ok",
                "reasoning": {"thoughts": {
                    "reasoning": "r",
                    "plan": ["step 1", "step 2"],
                    "criticism": "c"
                }}
            })))
            .unwrap();

        assert_eq!(shaped.reasoning.as_deref(), Some("r"));
        assert_eq!(shaped.plan.as_deref(), Some(r#"["step 1","step 2"]"#));
        assert_eq!(shaped.criticism.as_deref(), Some("c"));
    }

    #[test]
    fn flat_thoughts_reasoning() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({"reasoning": {"reasoning": "r", "plan": "p"}})))
            .unwrap();
        assert_eq!(shaped.reasoning.as_deref(), Some("r"));
        assert_eq!(shaped.plan.as_deref(), Some("p"));
        assert_eq!(shaped.criticism, None);
    }

    #[test]
    fn empty_thoughts_fall_through_to_direct_fields() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({
                "content": "x",
                "reasoning": {"thoughts": {}, "reasoning": "r", "plan": ["a"]}
            })))
            .unwrap();

        assert_eq!(shaped.reasoning.as_deref(), Some("r"));
        assert_eq!(shaped.plan.as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn populated_thoughts_win_over_direct_fields() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({
                "reasoning": {"thoughts": {"reasoning": "inner"}, "reasoning": "outer"}
            })))
            .unwrap();
        assert_eq!(shaped.reasoning.as_deref(), Some("inner"));
    }

    #[test]
    fn unrecognized_reasoning_is_absent_not_an_error() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({"content": "x", "reasoning": 17})))
            .unwrap();
        assert!(!shaped.has_reasoning());
    }

    #[test]
    fn null_content_becomes_empty_string() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({"content": null})))
            .unwrap();
        assert_eq!(shaped.content, "");
        assert_eq!(shaped.tool_calls, None);
        assert_eq!(shaped.executed_tools, None);
    }

    #[test]
    fn malformed_tool_calls_are_dropped_individually() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({
                "content": "",
                "tool_calls": [
                    {"id": "call_1", "type": "function",
                     "function": {"name": "search", "arguments": "{\"q\":\"rust\"}"}},
                    {"id": "call_2", "type": "function"},
                    {"function": {"name": "lookup", "arguments": {"id": 3}}}
                ]
            })))
            .unwrap();

        let calls = shaped.tool_calls.unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function.name, "search");
        assert_eq!(calls[0].function.arguments, r#"{"q":"rust"}"#);
        assert_eq!(calls[1].call_type, "function");
        assert_eq!(calls[1].function.arguments, r#"{"id":3}"#);
    }

    #[test]
    fn executed_tools_are_converted() {
        let shaped = ResponseShaper::new()
            .shape(&reply(json!({
                "content": "It is sunny.",
                "executed_tools": [
                    {"arguments": "{\"query\":\"weather\"}", "index": 0, "type": "search",
                     "output": "Sunny, 24C"},
                    {"index": "first", "type": "search"}
                ]
            })))
            .unwrap();

        let tools = shaped.executed_tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].tool_type, "search");
        assert_eq!(tools[0].output.as_deref(), Some("Sunny, 24C"));
    }

    #[test]
    fn reply_without_choices_is_provider_error() {
        let err = ResponseShaper::new()
            .shape(&CompletionReply::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::Provider(_)));
    }
}
