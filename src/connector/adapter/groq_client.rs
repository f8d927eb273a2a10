use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::CompletionProvider;
use crate::domain::{
    usable_key, CompletionReply, CompletionRequest, DomainError, ProviderSettings, ReasoningField,
    ReplyChoice, ReplyMessage,
};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const API_KEY_VAR: &str = "GROQ_API_KEY";
const BASE_URL_VAR: &str = "GROQ_BASE_URL";

/// HTTP client for the Groq chat-completions API (OpenAI-compatible).
///
/// Implements [`CompletionProvider`]; every transport or HTTP failure is
/// translated into one of the provider variants of [`DomainError`]:
///
/// | Condition                         | Error          |
/// |-----------------------------------|----------------|
/// | 401 / 403                         | `Authentication` |
/// | 429                               | `RateLimited`  |
/// | 400 / 404 / 413 / 422             | `Rejected` (provider's `error.message`) |
/// | connect failure or timeout        | `Unavailable`  |
/// | anything else                     | `Provider`     |
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            url,
        }
    }

    /// Build from the provider settings, with environment overrides:
    ///
    /// | Variable        | Falls back to          |
    /// |-----------------|------------------------|
    /// | `GROQ_API_KEY`  | `provider.api_key`     |
    /// | `GROQ_BASE_URL` | `provider.base_url`    |
    ///
    /// Returns `None` when no usable API key is available.
    pub fn from_settings(settings: &ProviderSettings) -> Option<Self> {
        let env_key = std::env::var(API_KEY_VAR).ok();
        let key = env_key
            .as_deref()
            .and_then(usable_key)
            .or_else(|| settings.usable_api_key())?
            .to_string();
        let base = std::env::var(BASE_URL_VAR).unwrap_or_else(|_| settings.base_url.clone());
        Some(Self::new(key, base, Duration::from_secs(settings.timeout_secs)))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GroqClient: API returned {status}: {body}");
            return Err(status_error(status.as_u16(), status.canonical_reason(), &body));
        }

        if request.parameters.stream {
            let body = response.text().await.map_err(transport_error)?;
            return fold_event_stream(&body);
        }

        response
            .json::<CompletionReply>()
            .await
            .map_err(|e| DomainError::provider(format!("failed to parse completion reply: {e}")))
    }

    fn name(&self) -> &str {
        "groq"
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_connect() || e.is_timeout() {
        DomainError::unavailable(format!("GroqClient: provider not reachable: {e}"))
    } else {
        DomainError::provider(format!("GroqClient: request failed: {e}"))
    }
}

/// Pull `error.message` out of an error body, else the body text, else the
/// status reason.
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| reason.unwrap_or("unknown error").to_string())
}

fn status_error(status: u16, reason: Option<&str>, body: &str) -> DomainError {
    let message = error_message(body, reason);
    match status {
        401 | 403 => DomainError::authentication(message),
        429 => DomainError::rate_limited(message),
        400 | 404 | 413 | 422 => DomainError::rejected(message),
        _ => DomainError::provider(format!("HTTP {status}: {message}")),
    }
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning: Option<Value>,
    #[serde(default)]
    tool_calls: Option<Vec<Value>>,
    #[serde(default)]
    executed_tools: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

/// Fold a server-sent-event body into a single reply: text deltas are
/// concatenated, tool records collected in arrival order.
fn fold_event_stream(body: &str) -> Result<CompletionReply, DomainError> {
    let mut reply = CompletionReply::default();
    let mut content = String::new();
    let mut reasoning_text = String::new();
    let mut reasoning_value: Option<Value> = None;
    let mut tool_calls: Vec<Value> = Vec::new();
    let mut executed_tools: Vec<Value> = Vec::new();
    let mut role = None;
    let mut finish_reason = None;

    for data in body
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty() && *data != "[DONE]")
    {
        let event: Value = serde_json::from_str(data)
            .map_err(|e| DomainError::provider(format!("malformed stream event: {e}")))?;
        if let Some(error) = event.get("error") {
            return Err(DomainError::provider(format!(
                "stream reported an error: {}",
                error["message"].as_str().unwrap_or("unknown error")
            )));
        }

        let chunk: StreamChunk = match serde_json::from_value(event) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Skipping unrecognized stream event: {e}");
                continue;
            }
        };
        reply.id = reply.id.or(chunk.id);
        reply.model = reply.model.or(chunk.model);

        for choice in chunk.choices {
            let delta = choice.delta;
            role = role.or(delta.role);
            if let Some(text) = delta.content {
                content.push_str(&text);
            }
            match delta.reasoning {
                Some(Value::String(text)) => reasoning_text.push_str(&text),
                Some(Value::Null) | None => {}
                Some(other) => reasoning_value = Some(other),
            }
            for fragment in delta.tool_calls.unwrap_or_default() {
                merge_tool_call_fragment(&mut tool_calls, fragment);
            }
            executed_tools.extend(delta.executed_tools.unwrap_or_default());
            finish_reason = choice.finish_reason.or(finish_reason);
        }
    }

    let reasoning = if !reasoning_text.is_empty() {
        Some(ReasoningField::Text(reasoning_text))
    } else {
        reasoning_value.and_then(|v| serde_json::from_value(v).ok())
    };

    reply.choices.push(ReplyChoice {
        index: 0,
        message: ReplyMessage {
            role,
            content: Some(content),
            reasoning,
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            executed_tools: (!executed_tools.is_empty()).then_some(executed_tools),
        },
        finish_reason,
    });

    Ok(reply)
}

/// Streamed tool calls arrive as fragments sharing an `index`; only the
/// first carries `id`, `type` and `function.name`. Later fragments extend
/// `function.arguments`.
fn merge_tool_call_fragment(calls: &mut Vec<Value>, fragment: Value) {
    let index = fragment.get("index").and_then(Value::as_u64);
    let existing = index.and_then(|index| {
        calls
            .iter_mut()
            .find(|call| call.get("index").and_then(Value::as_u64) == Some(index))
    });

    let Some(existing) = existing else {
        calls.push(fragment);
        return;
    };

    for key in ["id", "type"] {
        if existing.get(key).map_or(true, Value::is_null) {
            if let Some(value) = fragment.get(key).filter(|v| !v.is_null()) {
                existing[key] = value.clone();
            }
        }
    }

    let Some(function) = fragment.get("function") else {
        return;
    };
    if !existing.get("function").is_some_and(Value::is_object) {
        existing["function"] = function.clone();
        return;
    }
    let target = &mut existing["function"];
    if target.get("name").map_or(true, Value::is_null) {
        if let Some(name) = function.get("name").filter(|v| !v.is_null()) {
            target["name"] = name.clone();
        }
    }
    if let Some(more) = function.get("arguments").and_then(Value::as_str) {
        let mut arguments = target
            .get("arguments")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        arguments.push_str(more);
        target["arguments"] = Value::String(arguments);
    }
}
