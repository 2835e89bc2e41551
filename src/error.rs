// src/error.rs

//! Unified error handling for the announcer.

use std::fmt;

use thiserror::Error;

/// Result type alias for announcer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The commit diff does not touch exactly the catalog file
    #[error("Invalid diff shape: {0}")]
    InvalidDiffShape(String),

    /// No added line matched the catalog entry pattern
    #[error("Could not match a catalog entry in the added lines")]
    NoEntryFound,

    /// The entry line or its heading could not be located in the catalog
    #[error("Could not find a section for catalog entry: {0}")]
    SectionNotFound(String),

    /// Version control command failed
    #[error("Git error: {0}")]
    Vcs(String),

    /// Publishing credentials are absent for a real post
    #[error("{0} credentials not available")]
    MissingCredentials(&'static str),

    /// Platform rejected a submission
    #[error("Publish error for {platform}: {message}")]
    Publish {
        platform: &'static str,
        message: String,
    },

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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a diff shape error.
    pub fn diff_shape(message: impl Into<String>) -> Self {
        Self::InvalidDiffShape(message.into())
    }

    /// Create a missing section error for the given entry line.
    pub fn section_not_found(entry_line: impl Into<String>) -> Self {
        Self::SectionNotFound(entry_line.into())
    }

    /// Create a version control error.
    pub fn vcs(message: impl fmt::Display) -> Self {
        Self::Vcs(message.to_string())
    }

    /// Create a publishing error with platform context.
    pub fn publish(platform: &'static str, message: impl fmt::Display) -> Self {
        Self::Publish {
            platform,
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error means the commit was not a valid catalog addition.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDiffShape(_) | Self::NoEntryFound | Self::SectionNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(AppError::NoEntryFound.is_input_error());
        assert!(AppError::diff_shape("two files").is_input_error());
        assert!(AppError::section_not_found("- [a](b) - c").is_input_error());
        assert!(!AppError::MissingCredentials("Twitter").is_input_error());
        assert!(!AppError::config("bad").is_input_error());
    }

    #[test]
    fn test_publish_error_message() {
        let err = AppError::publish("Bluesky", "401 Unauthorized");
        assert_eq!(
            err.to_string(),
            "Publish error for Bluesky: 401 Unauthorized"
        );
    }
}
