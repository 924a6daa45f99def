//! Application settings.
//!
//! Settings are read from a TOML file in the platform-specific config
//! directory. Every value has a default, so the file is optional.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "Bakatex";

/// Default settings filename.
const SETTINGS_FILENAME: &str = "settings.toml";

/// Main settings structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File paths.
    pub paths: PathsConfig,

    /// Web scraping settings.
    pub scraping: ScrapingConfig,

    /// Typesetting tool settings.
    pub render: RenderConfig,
}

/// File path configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory the `<main title>` output tree is created in.
    pub output_directory: PathBuf,

    /// Directory holding the template files.
    pub templates_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            templates_directory: PathBuf::from("templates"),
        }
    }
}

/// Web scraping configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Base URL image identifiers are appended to.
    pub image_base_url: String,

    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            image_base_url: "http://www.baka-tsuki.org/project/images/".to_string(),
            delay_between_requests_sec: 0.0,
        }
    }
}

/// Typesetting tool configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable, looked up on PATH.
    pub command: String,

    /// Orientation value given to the image format for landscape images.
    pub landscape_hint: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            command: "pdflatex".to_string(),
            landscape_hint: "angle=90".to_string(),
        }
    }
}

impl Settings {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the settings file.
    pub fn settings_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(SETTINGS_FILENAME))
    }

    /// Loads settings from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::settings_path()?;
        Self::load_from(&path)
    }

    /// Loads settings from a specific path, falling back to defaults when
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scraping.image_base_url.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "scraping.image_base_url".to_string(),
                message: "must end with '/'".to_string(),
            });
        }

        if url::Url::parse(&self.scraping.image_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "scraping.image_base_url".to_string(),
                message: "must be an absolute URL".to_string(),
            });
        }

        if self.scraping.delay_between_requests_sec < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.delay_between_requests_sec".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.render.command.trim().is_empty() {
            return Err(ConfigError::MissingValue("render.command".to_string()));
        }

        Ok(())
    }
}
