// src/error.rs

//! Unified error handling for the sync application.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Connection failure or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API payload could not be parsed or lacks the expected envelope
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// No usable on-disk cache for a section
    #[error("No usable cache for section '{section}' at {path:?}")]
    CacheMiss { section: String, path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// An operation on a named section failed
    #[error("Section '{section}' failed during {operation}: {source}")]
    Section {
        section: String,
        operation: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Create a malformed response error.
    pub fn malformed(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a cache miss error.
    pub fn cache_miss(section: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::CacheMiss {
            section: section.into(),
            path: path.into(),
        }
    }

    /// Attach the failing section and operation to an error.
    pub fn in_section(self, section: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Section {
            section: section.into(),
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a cache miss.
    pub fn is_cache_miss(&self) -> bool {
        match self {
            Self::CacheMiss { .. } => true,
            Self::Section { source, .. } => source.is_cache_miss(),
            _ => false,
        }
    }
}
