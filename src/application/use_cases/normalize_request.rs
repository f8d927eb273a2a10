use tracing::{debug, warn};

use crate::domain::{
    ChatRequest, CompletionParameters, CompletionRequest, ContentPart, ConversationTurn,
    DomainError, MessageContent, PurposeSettings, ReasoningFormat,
};

use super::AttachmentInliner;

/// Merges configuration with request overrides and assembles the outbound
/// message list.
#[derive(Debug, Clone)]
pub struct RequestNormalizer {
    inliner: AttachmentInliner,
}

impl RequestNormalizer {
    pub fn new(inliner: AttachmentInliner) -> Self {
        Self { inliner }
    }

    pub async fn build(
        &self,
        request: &ChatRequest,
        settings: &PurposeSettings,
    ) -> Result<CompletionRequest, DomainError> {
        let parameters = resolve_parameters(request, settings);

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !settings.system_prompt.is_empty() {
            messages.push(ConversationTurn::system(settings.system_prompt.clone()));
        }

        if request.purpose.is_expand_prompt() {
            let latest_user = request
                .messages
                .iter()
                .rev()
                .find(|turn| turn.is_user())
                .ok_or_else(|| {
                    DomainError::invalid_request("no user message to expand was provided")
                })?;
            let turn = self.process_turn(latest_user).await.ok_or_else(|| {
                DomainError::invalid_request("the user message to expand has no usable content")
            })?;
            messages.push(turn);
        } else {
            for turn in &request.messages {
                if let Some(processed) = self.process_turn(turn).await {
                    messages.push(processed);
                }
            }
        }

        Ok(CompletionRequest::new(messages, parameters))
    }

    /// Inline attachments of a plain-text turn, or filter the parts of a
    /// multi-part turn. Returns `None` for turns that must not be forwarded.
    async fn process_turn(&self, turn: &ConversationTurn) -> Option<ConversationTurn> {
        match &turn.content {
            MessageContent::Text(text) => {
                let content = if AttachmentInliner::has_placeholders(text) {
                    self.inliner.inline(text).await.into_content()
                } else {
                    text.clone()
                };
                debug!("  - {}: '{}'", turn.role, preview(&content));
                Some(ConversationTurn::new(
                    turn.role.clone(),
                    MessageContent::Text(content),
                ))
            }
            MessageContent::Parts(parts) => {
                let kept: Vec<ContentPart> =
                    parts.iter().filter(|p| p.is_supported()).cloned().collect();
                if kept.is_empty() {
                    warn!(
                        "Skipping {} turn: none of its {} parts are text or image references",
                        turn.role,
                        parts.len()
                    );
                    return None;
                }
                debug!("  - {}: {} of {} parts kept", turn.role, kept.len(), parts.len());
                Some(ConversationTurn::new(
                    turn.role.clone(),
                    MessageContent::Parts(kept),
                ))
            }
            other => {
                warn!(
                    "Skipping {} turn with unsupported content type: {}",
                    turn.role,
                    other.kind()
                );
                None
            }
        }
    }
}

/// Resolve outbound parameters for `request` under `settings`.
///
/// Overrides apply only to `main_chat`, and only when present; a present
/// zero still overrides. Reasoning output is requested only for `main_chat`
/// on models listed as reasoning-capable.
pub fn resolve_parameters(request: &ChatRequest, settings: &PurposeSettings) -> CompletionParameters {
    let main_chat = request.purpose.is_main_chat();

    let (model, temperature, max_completion_tokens) = if main_chat {
        (
            request
                .model_name
                .clone()
                .unwrap_or_else(|| settings.model_name.clone()),
            request.temperature.unwrap_or(settings.temperature),
            request.max_tokens.unwrap_or(settings.max_completion_tokens),
        )
    } else {
        if request.model_name.is_some() || request.temperature.is_some() || request.max_tokens.is_some()
        {
            debug!(
                "Ignoring request overrides for purpose '{}'",
                request.purpose
            );
        }
        (
            settings.model_name.clone(),
            settings.temperature,
            settings.max_completion_tokens,
        )
    };

    let reasoning_format = if main_chat && settings.supports_reasoning(&model) {
        Some(
            settings
                .reasoning_format
                .parse::<ReasoningFormat>()
                .unwrap_or_else(|e| {
                    warn!("{} in settings, using '{}'", e, ReasoningFormat::Parsed);
                    ReasoningFormat::Parsed
                }),
        )
    } else {
        None
    };

    CompletionParameters {
        model,
        temperature,
        max_completion_tokens,
        top_p: settings.top_p,
        stream: settings.stream,
        reasoning_format,
    }
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
