mod chat_completion;
mod cleanup_uploads;
mod inline_attachments;
mod normalize_request;
mod resolve_settings;
mod shape_response;

pub use chat_completion::*;
pub use cleanup_uploads::*;
pub use inline_attachments::*;
pub use normalize_request::*;
pub use resolve_settings::*;
pub use shape_response::*;
