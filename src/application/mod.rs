//! # Application Layer
//!
//! The provider interface and the use cases that turn a chat request into a
//! single completion call and a shaped reply.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
