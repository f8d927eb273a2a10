//! Domain services holding pure business rules.

mod error_classifier;

pub use error_classifier::*;
