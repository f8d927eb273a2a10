pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    AttachmentInliner, ChatCompletionUseCase, CleanupUploadsUseCase, CompletionProvider,
    RequestNormalizer, ResponseShaper, SettingsResolver,
};

pub use connector::{
    Container, ContainerConfig, GroqClient, HttpServer, HttpServerConfig, JsonSettingsLoader,
    LocalUploadStore, MockCompletionProvider,
};

pub use domain::{
    classify, ChatRequest, ChatResponse, ClassifiedError, CompletionReply, CompletionRequest,
    ConversationTurn, DomainError, ErrorCode, MessageContent, Purpose, PurposeSettings, Settings,
};
