//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Provider client (Groq over reqwest) and an offline mock
//! - JSON settings loader and local upload store
//! - HTTP surface (axum) and CLI controllers

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
