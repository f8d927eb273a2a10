pub mod cleanup_controller;
pub mod models_controller;

pub use cleanup_controller::CleanupController;
pub use models_controller::ModelsController;
