// src/error.rs

//! Unified error handling for the deal finder.

use std::fmt;

use thiserror::Error;

/// Result type alias for deal finder operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error (unknown store, unknown strategy, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A want-list line could not be parsed into a card
    #[error("Malformed card line: {line:?}")]
    MalformedCardLine { line: String },

    /// A condition label or alias is not recognized
    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    /// One store backend's fetch failed (timeout, bad status, bad payload)
    #[error("Store {store} unavailable: {message}")]
    StoreUnavailable { store: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed-card-line error.
    pub fn malformed_line(line: impl Into<String>) -> Self {
        Self::MalformedCardLine { line: line.into() }
    }

    /// Create an invalid-quality error.
    pub fn invalid_quality(label: impl Into<String>) -> Self {
        Self::InvalidQuality(label.into())
    }

    /// Create a store-unavailable error with context.
    pub fn store_unavailable(store: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            message: message.to_string(),
        }
    }
}
