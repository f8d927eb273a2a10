use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::CompletionProvider;
use crate::domain::{
    CompletionReply, CompletionRequest, DomainError, MessageContent, ReasoningField, ReplyMessage,
};

/// Offline [`CompletionProvider`] that never touches the network.
///
/// By default it echoes the latest user text back. A fixed reply or a
/// failure can be scripted instead. Every request it receives is recorded.
#[derive(Default)]
pub struct MockCompletionProvider {
    reply: Option<CompletionReply>,
    failure: Option<fn() -> DomainError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, reply: CompletionReply) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_failure(mut self, failure: fn() -> DomainError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn echo(request: &CompletionRequest) -> CompletionReply {
        let latest = request
            .messages
            .iter()
            .rev()
            .find(|turn| turn.is_user())
            .map(|turn| match &turn.content {
                MessageContent::Text(text) => text.clone(),
                other => format!("<{} content>", other.kind()),
            })
            .unwrap_or_default();

        let mut reply = CompletionReply::from_message(ReplyMessage {
            role: Some("assistant".to_string()),
            content: Some(format!("Echo: {latest}")),
            reasoning: request
                .parameters
                .reasoning_format
                .map(|format| ReasoningField::Text(format!("mock reasoning ({format})"))),
            ..ReplyMessage::default()
        });
        reply.model = Some(request.parameters.model.clone());
        reply
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, DomainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(failure) = self.failure {
            return Err(failure());
        }

        Ok(self.reply.clone().unwrap_or_else(|| Self::echo(request)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompletionParameters, ConversationTurn};

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            vec![ConversationTurn::system("s"), ConversationTurn::user("ping")],
            CompletionParameters {
                model: "m1".into(),
                temperature: 0.6,
                max_completion_tokens: 16,
                top_p: 0.95,
                stream: false,
                reasoning_format: None,
            },
        )
    }

    #[tokio::test]
    async fn echoes_latest_user_turn_and_records_request() {
        let provider = MockCompletionProvider::new();
        let reply = provider.complete(&request()).await.unwrap();

        assert_eq!(
            reply.first_message().unwrap().content.as_deref(),
            Some("Echo: ping")
        );
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.requests()[0].model(), "m1");
    }

    #[tokio::test]
    async fn scripted_failure_is_returned() {
        let provider =
            MockCompletionProvider::new().with_failure(|| DomainError::rate_limited("slow down"));
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
