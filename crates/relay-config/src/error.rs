//! Configuration Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make the effective configuration unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read
    #[error("Error reading config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JEC file is not a valid JSON document
    #[error("Invalid JSON in config file {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    /// Base URL is not absolute or has no host
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// No API key in any layer
    #[error("API key is not configured")]
    MissingApiKey,

    /// Override is not a `key=value` pair
    #[error("Invalid config override: {0}")]
    InvalidOverride(String),

    /// Value cannot be used for its key
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
