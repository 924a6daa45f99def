//! Error types for the bakatex pipeline.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for the volume list and the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for loading the template files.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A template file could not be read
    #[error("Failed to read template {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document file does not hold exactly five formats
    #[error("Document template must hold 5 formats, found {found}")]
    MalformedDocument { found: usize },

    /// A format string could not be parsed
    #[error("Bad format in '{name}': {message}")]
    BadFormat { name: String, message: String },
}

/// Error type for remote fetches.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error type for pages that do not follow the expected wiki layout.
#[derive(Error, Debug)]
pub enum PageError {
    /// The required element isn't found in HTML
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

/// Error type for mirroring illustration images.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Local filesystem operation failed
    #[error("Image I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote fetch failed
    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] FetchError),
}

/// Error type for invoking the typesetting tool.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer executable not on PATH
    #[error("Renderer '{command}' not found: {source}")]
    NotFound {
        command: String,
        #[source]
        source: which::Error,
    },

    /// Spawning or waiting on the renderer failed
    #[error("Failed to run renderer: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
