//! Error types for settings loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::filter::ConfigError;

/// Errors raised while turning a settings file into a [`crate::filter::FilterConfig`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Settings text is not valid JSON.
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level JSON value is not an object.
    #[error("settings must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A known key carries a value that cannot be coerced.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Key as written in the file.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Normalized settings still describe an unusable filter.
    #[error("settings produce an unusable filter: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    /// Creates an invalid-value error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
