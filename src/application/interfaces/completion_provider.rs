use async_trait::async_trait;

use crate::domain::{CompletionReply, CompletionRequest, DomainError};

/// Issues one chat-completion call against an LLM inference API.
///
/// Implementors own transport, authentication and wire-format details and
/// report failures only through the provider variants of [`DomainError`]
/// (`Authentication`, `RateLimited`, `Unavailable`, `Rejected`, `Provider`),
/// so callers never see vendor-specific error types. A call is attempted
/// exactly once; retry policy belongs to the caller.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, DomainError>;

    /// Short provider label for logs.
    fn name(&self) -> &str;
}
