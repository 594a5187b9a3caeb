//! Utility functions and helpers.

pub mod http;
pub mod locale;
pub mod slug;
pub mod url;

pub use locale::{localized_str, resolve_localized};
pub use slug::slugify;
