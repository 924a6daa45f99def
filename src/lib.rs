//! Bakatex - wiki light novel to LaTeX typesetter.
//!
//! This library provides functionality for:
//! - Fetching serialized novel volumes from a MediaWiki-style site
//! - Mirroring the illustrations each volume references
//! - Translating the page markup into LaTeX source from user templates
//! - Running the typesetting tool on volumes whose source changed

pub mod config;
pub mod console;
pub mod document;
pub mod error;
pub mod fetch;
pub mod images;
pub mod markup;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod template;

// Re-export commonly used types
pub use config::{Config, Volume};
pub use console::Console;
pub use document::{Document, WriteOutcome};
pub use error::{ConfigError, FetchError, ImageError, PageError, RenderError, TemplateError};
pub use fetch::{Fetcher, HttpFetcher};
pub use markup::{Chapter, Page, Translator};
pub use pipeline::{Pipeline, VolumeStatus};
pub use render::{LatexRenderer, Render};
pub use settings::Settings;
pub use template::Template;
