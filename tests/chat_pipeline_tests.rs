//! End-to-end tests of the chat pipeline against the offline provider.

use std::sync::Arc;

use chatrelay::application::attachment_placeholder;
use chatrelay::domain::{CompletionReply, ReasoningField, ReasoningFormat, ReplyMessage};
use chatrelay::{
    AttachmentInliner, ChatCompletionUseCase, ChatRequest, CompletionProvider, ConversationTurn,
    DomainError, JsonSettingsLoader, MessageContent, MockCompletionProvider, Settings,
};
use serde_json::json;
use tempfile::{tempdir, TempDir};

const CONFIG: &str = r#"{
    "main_chat": {
        "model_name": "m1",
        "temperature": 0.6,
        "system_prompt": "Respond in fluent Japanese",
        "reasoning_supported_models": ["m1"],
        "available_models": ["m1", "m2"]
    },
    "expand_prompt": {
        "model_name": "m-expand",
        "temperature": 0.2,
        "system_prompt": "Expand the prompt."
    }
}"#;

struct TestEnv {
    provider: Arc<MockCompletionProvider>,
    use_case: ChatCompletionUseCase,
    uploads: TempDir,
}

fn setup_with(provider: MockCompletionProvider) -> TestEnv {
    let settings: Settings = JsonSettingsLoader::parse(CONFIG).expect("valid settings");
    let uploads = tempdir().expect("temp dir");
    let provider = Arc::new(provider);
    let use_case = ChatCompletionUseCase::new(
        Arc::new(settings),
        provider.clone() as Arc<dyn CompletionProvider>,
        AttachmentInliner::new(uploads.path()),
    );
    TestEnv {
        provider,
        use_case,
        uploads,
    }
}

fn setup() -> TestEnv {
    setup_with(MockCompletionProvider::new())
}

fn text_of(turn: &ConversationTurn) -> &str {
    turn.content.as_text().expect("text content")
}

#[tokio::test]
async fn test_main_chat_uses_purpose_defaults() {
    let env = setup();
    let request = ChatRequest::new(vec![ConversationTurn::user("hi")]);

    let response = env.use_case.execute(request).await.expect("chat succeeds");
    assert_eq!(response.content, "Echo: hi");
    assert_eq!(response.reasoning.as_deref(), Some("mock reasoning (parsed)"));

    let sent = env.provider.requests();
    assert_eq!(sent.len(), 1);
    let outbound = &sent[0];
    assert_eq!(outbound.parameters.model, "m1");
    assert_eq!(outbound.parameters.temperature, 0.6);
    assert_eq!(outbound.parameters.reasoning_format, Some(ReasoningFormat::Parsed));
    assert_eq!(outbound.messages.len(), 2);
    assert_eq!(outbound.messages[0].role, "system");
    assert_eq!(text_of(&outbound.messages[0]), "Respond in fluent Japanese");
    assert_eq!(text_of(&outbound.messages[1]), "hi");
}

#[tokio::test]
async fn test_main_chat_overrides_including_zero_temperature() {
    let env = setup();
    let request = ChatRequest::new(vec![ConversationTurn::user("hi")])
        .with_model("m2")
        .with_temperature(0.0)
        .with_max_tokens(10);

    let response = env.use_case.execute(request).await.expect("chat succeeds");
    assert!(response.reasoning.is_none());

    let params = &env.provider.requests()[0].parameters;
    assert_eq!(params.model, "m2");
    assert_eq!(params.temperature, 0.0);
    assert_eq!(params.max_completion_tokens, 10);
    assert_eq!(params.reasoning_format, None, "m2 is not reasoning-capable");
}

#[tokio::test]
async fn test_expand_prompt_forwards_only_last_user_turn() {
    let env = setup();
    let request = ChatRequest::new(vec![
        ConversationTurn::user("first"),
        ConversationTurn::assistant("answer"),
        ConversationTurn::user("write a poem"),
    ])
    .with_purpose("expand_prompt")
    .with_model("ignored")
    .with_temperature(1.5);

    env.use_case.execute(request).await.expect("chat succeeds");

    let outbound = &env.provider.requests()[0];
    assert_eq!(outbound.parameters.model, "m-expand");
    assert_eq!(outbound.parameters.temperature, 0.2);
    assert_eq!(outbound.parameters.reasoning_format, None);
    assert_eq!(outbound.messages.len(), 2);
    assert_eq!(text_of(&outbound.messages[0]), "Expand the prompt.");
    assert_eq!(text_of(&outbound.messages[1]), "write a poem");
}

#[tokio::test]
async fn test_expand_prompt_without_user_turn_is_rejected_before_provider() {
    let env = setup();
    let request = ChatRequest::new(vec![ConversationTurn::assistant("only me")])
        .with_purpose("expand_prompt");

    let err = env.use_case.execute(request).await.unwrap_err();
    assert!(err.is_invalid_request());
    assert_eq!(env.provider.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_purpose_falls_back_to_main_chat() {
    let env = setup();
    let request =
        ChatRequest::new(vec![ConversationTurn::user("hi")]).with_purpose("generate_metaprompt");

    env.use_case.execute(request).await.expect("chat succeeds");
    assert_eq!(env.provider.requests()[0].parameters.model, "m1");
}

#[tokio::test]
async fn test_authentication_failure_is_surfaced_after_one_call() {
    let env = setup_with(
        MockCompletionProvider::new().with_failure(|| DomainError::authentication("bad key")),
    );
    let request = ChatRequest::new(vec![ConversationTurn::user("hi")]);

    let err = env.use_case.execute(request).await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(env.provider.call_count(), 1);
}

#[tokio::test]
async fn test_scripted_reply_is_shaped() {
    let reply: CompletionReply = serde_json::from_value(json!({
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "done",
                "reasoning": {"thoughts": {"reasoning": "r", "plan": ["a", "b"]}},
                "tool_calls": [
                    {"type": "function", "function": {"name": "lookup", "arguments": {"q": 1}}},
                    {"broken": true}
                ]
            }
        }]
    }))
    .expect("valid reply");
    let env = setup_with(MockCompletionProvider::new().with_reply(reply));

    let response = env
        .use_case
        .execute(ChatRequest::new(vec![ConversationTurn::user("go")]))
        .await
        .expect("chat succeeds");

    assert_eq!(response.content, "done");
    assert_eq!(response.reasoning.as_deref(), Some("r"));
    assert_eq!(response.plan.as_deref(), Some(r#"["a","b"]"#));
    assert!(response.criticism.is_none());
    let calls = response.tool_calls.expect("one valid tool call");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name, "lookup");
    assert_eq!(calls[0].function.arguments, r#"{"q":1}"#);
    assert!(response.executed_tools.is_none());
}

#[tokio::test]
async fn test_reply_without_choices_is_provider_error() {
    let env = setup_with(MockCompletionProvider::new().with_reply(CompletionReply::default()));

    let err = env
        .use_case
        .execute(ChatRequest::new(vec![ConversationTurn::user("go")]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Provider(_)));
}

#[tokio::test]
async fn test_text_reasoning_is_passed_through() {
    let reply = CompletionReply::from_message(ReplyMessage {
        content: Some("ok".into()),
        reasoning: Some(ReasoningField::Text("thinking".into())),
        ..ReplyMessage::default()
    });
    let env = setup_with(MockCompletionProvider::new().with_reply(reply));

    let response = env
        .use_case
        .execute(ChatRequest::new(vec![ConversationTurn::user("go")]))
        .await
        .expect("chat succeeds");
    assert_eq!(response.reasoning.as_deref(), Some("thinking"));
}

#[tokio::test]
async fn test_attachment_is_inlined_into_user_turn() {
    let env = setup();
    let path = env.uploads.path().join("notes.txt");
    std::fs::write(&path, "line one\nline two").unwrap();

    let text = format!(
        "Summarize this {}",
        attachment_placeholder("notes.txt", &path)
    );
    env.use_case
        .execute(ChatRequest::new(vec![ConversationTurn::user(text)]))
        .await
        .expect("chat succeeds");

    let outbound = &env.provider.requests()[0];
    let user_text = text_of(&outbound.messages[1]);
    assert_eq!(
        user_text,
        "Summarize this\n\n--- BEGIN ATTACHMENT: notes.txt ---\nline one\nline two\n--- END ATTACHMENT: notes.txt ---"
    );
}

#[tokio::test]
async fn test_missing_attachment_becomes_error_marker() {
    let env = setup();
    let path = env.uploads.path().join("gone.txt");

    let text = format!("Read {}", attachment_placeholder("gone.txt", &path));
    env.use_case
        .execute(ChatRequest::new(vec![ConversationTurn::user(text)]))
        .await
        .expect("chat still succeeds");

    let user_text = text_of(&env.provider.requests()[0].messages[1]).to_string();
    assert!(user_text.contains("[Attachment error: 'gone.txt' could not be found]"));
    assert!(!user_text.contains("[[attachment:"));
}

#[tokio::test]
async fn test_unsupported_parts_are_filtered() {
    let env = setup();
    let turn: ConversationTurn = serde_json::from_value(json!({
        "role": "user",
        "content": [
            {"type": "text", "text": "what is this?"},
            {"type": "audio", "data": "..."},
            {"type": "image_url", "image_url": {"url": "https://example.com/cat.png"}}
        ]
    }))
    .expect("valid turn");

    env.use_case
        .execute(ChatRequest::new(vec![turn]))
        .await
        .expect("chat succeeds");

    let outbound = &env.provider.requests()[0];
    match &outbound.messages[1].content {
        MessageContent::Parts(parts) => {
            assert_eq!(parts.len(), 2);
            assert!(parts.iter().all(|p| p.is_supported()));
        }
        other => panic!("expected parts, got {:?}", other),
    }
}
