//! Cross-form references and submission timing

pub mod deadlines;
pub mod dependencies;

pub use deadlines::extract_deadlines;
pub use dependencies::extract_dependencies;
