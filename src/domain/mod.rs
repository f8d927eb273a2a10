//! # Domain Layer
//!
//! Conversation, settings and reply models, the error type and its
//! classification. Independent of HTTP and the provider SDK.

pub mod error;
pub mod models;
pub mod services;

pub use error::*;
pub use models::*;
pub use services::*;
