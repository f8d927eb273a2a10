mod chat_response;
mod completion;
mod conversation;
mod settings;

pub use chat_response::*;
pub use completion::*;
pub use conversation::*;
pub use settings::*;
