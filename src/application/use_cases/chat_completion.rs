use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::CompletionProvider;
use crate::domain::{ChatRequest, ChatResponse, DomainError, Settings};

use super::{AttachmentInliner, RequestNormalizer, ResponseShaper, SettingsResolver};

/// One inbound chat request to one outbound completion call.
///
/// Resolve settings for the purpose, normalize the request, call the
/// provider exactly once, shape the reply. Holds nothing mutable, so
/// concurrent requests never observe each other.
pub struct ChatCompletionUseCase {
    resolver: SettingsResolver,
    normalizer: RequestNormalizer,
    shaper: ResponseShaper,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatCompletionUseCase {
    pub fn new(
        settings: Arc<Settings>,
        provider: Arc<dyn CompletionProvider>,
        inliner: AttachmentInliner,
    ) -> Self {
        Self {
            resolver: SettingsResolver::new(settings),
            normalizer: RequestNormalizer::new(inliner),
            shaper: ResponseShaper::new(),
            provider,
        }
    }

    pub async fn execute(&self, request: ChatRequest) -> Result<ChatResponse, DomainError> {
        info!(
            "Chat request: purpose={}, turns={}",
            request.purpose,
            request.messages.len()
        );

        let settings = self.resolver.resolve(&request.purpose)?;
        let completion = self.normalizer.build(&request, settings).await?;

        let params = &completion.parameters;
        info!(
            "Calling {} with model={} temperature={} max_completion_tokens={} top_p={} stream={} reasoning_format={}",
            self.provider.name(),
            params.model,
            params.temperature,
            params.max_completion_tokens,
            params.top_p,
            params.stream,
            params
                .reasoning_format
                .map(|f| f.as_str())
                .unwrap_or("none"),
        );
        debug!("Outbound message count: {}", completion.messages.len());

        let start_time = Instant::now();
        let reply = self.provider.complete(&completion).await;
        let duration = start_time.elapsed();
        info!(
            "{} call finished in {:.2}s",
            self.provider.name(),
            duration.as_secs_f64()
        );

        let response = self.shaper.shape(&reply?)?;
        debug!(
            "Shaped reply: {} chars, reasoning={}, tool_calls={}, executed_tools={}",
            response.content.len(),
            response.has_reasoning(),
            response.tool_calls.as_ref().map_or(0, Vec::len),
            response.executed_tools.as_ref().map_or(0, Vec::len),
        );

        Ok(response)
    }
}
