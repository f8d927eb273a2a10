use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::application::attachment_placeholder;
use crate::connector::api::Container;
use crate::domain::{classify, ChatRequest, ChatResponse, ClassifiedError, DomainError};

/// A classified failure rendered as `{"detail", "code"}` with its status.
pub struct ApiError(ClassifiedError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let classified = classify(&err);
        if classified.status >= 500 {
            error!("Request failed ({}): {}", classified.code.as_str(), err);
        } else {
            warn!("Request failed ({}): {}", classified.code.as_str(), err);
        }
        Self(classified)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub provider_ready: bool,
    pub version: &'static str,
}

/// `GET /`: liveness plus whether the provider client is usable.
pub async fn health(State(container): State<Arc<Container>>) -> Json<HealthResponse> {
    let provider_ready = container.provider_ready();
    Json(HealthResponse {
        message: "Chat relay backend is running.",
        status: if provider_ready { "ok" } else { "degraded" },
        provider_ready,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// `GET /api/models`
pub async fn list_models(
    State(container): State<Arc<Container>>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let models = container.settings_resolver().selectable_models()?;
    Ok(Json(ModelsResponse { models }))
}

/// `POST /api/chat`. A body that is not a valid chat request is answered
/// as `invalid_request` rather than with the extractor's plain-text reply.
pub async fn chat(
    State(container): State<Arc<Container>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        DomainError::invalid_request(format!("malformed chat request: {}", rejection.body_text()))
    })?;
    let use_case = container.chat_use_case()?;
    let response = use_case.execute(request).await?;
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub file_path: String,
    pub placeholder: String,
}

/// `POST /api/upload`, multipart field `file`.
pub async fn upload(
    State(container): State<Arc<Container>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| DomainError::invalid_request(format!("could not read upload: {e}")))?;

        let stored = container.upload_store().save(&original_name, &bytes).await?;
        info!("Upload accepted: {}", stored.display_name);

        return Ok(Json(UploadResponse {
            placeholder: attachment_placeholder(&stored.display_name, &stored.path),
            file_path: stored.path.display().to_string(),
            filename: stored.display_name,
        }));
    }

    Err(DomainError::invalid_request("multipart body has no 'file' field").into())
}
