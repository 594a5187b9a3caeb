//! Storage for section caches and derived files.
//!
//! - `LocalStorage`: JSON/text files under the project directory
//! - `Section`: one API section's raw and processed cache

pub mod local;
pub mod section;

// Re-export for convenience
pub use local::LocalStorage;
pub use section::Section;
