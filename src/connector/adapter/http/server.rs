use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::connector::api::Container;

use super::handlers;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct HttpServerConfig {
    pub addr: SocketAddr,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

/// The relay's HTTP surface: health, models, chat and upload.
pub struct HttpServer {
    container: Arc<Container>,
    config: HttpServerConfig,
}

impl HttpServer {
    pub fn new(container: Arc<Container>, config: HttpServerConfig) -> Self {
        Self { container, config }
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.container), &self.config.allowed_origins)
    }

    pub async fn serve(self) -> Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("Chat relay listening on http://{}", listener.local_addr()?);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

pub fn build_router(container: Arc<Container>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/api/models", get(handlers::list_models))
        .route("/api/chat", post(handlers::chat))
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(cors)
        .with_state(container)
}
