mod groq_client;
mod json_settings_loader;
mod local_upload_store;
mod mock_completion;

pub mod http;

pub use groq_client::*;
pub use json_settings_loader::*;
pub use local_upload_store::*;
pub use mock_completion::*;
pub use http::{build_router, HttpServer, HttpServerConfig};
