//! axum HTTP surface of the relay.

mod handlers;
mod server;

pub use handlers::{ApiError, HealthResponse, ModelsResponse, UploadResponse};
pub use server::{build_router, HttpServer, HttpServerConfig, MAX_UPLOAD_BYTES};
