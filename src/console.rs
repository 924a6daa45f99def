//! Terminal output for a generation run.
//!
//! Every line the tool prints goes through [`Console`]: a labelled status
//! line per pipeline step (page fetch, image download, document write,
//! renderer pass), a header per volume, and styled paths and counts inside
//! messages. Colors are off when `NO_COLOR` is set or stdout is not a TTY.

use std::io::{self, IsTerminal};
use std::path::Path;

/// ANSI style codes used by the console.
#[derive(Debug, Clone, Copy)]
enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

/// Status labels printed in front of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    /// Work about to start: a fetch, a download, a renderer pass.
    Step,
    /// A volume generated or a document source written.
    Ok,
    /// Counts and up-to-date notices.
    Info,
    /// Recoverable trouble such as a failing renderer pass.
    Warn,
    /// The run is aborting.
    Error,
}

impl Label {
    fn text(self) -> &'static str {
        match self {
            Label::Step => "STEP",
            Label::Ok => "OK",
            Label::Info => "INFO",
            Label::Warn => "WARN",
            Label::Error => "ERROR",
        }
    }

    fn color(self) -> Style {
        match self {
            Label::Step => Style::Cyan,
            Label::Ok => Style::Green,
            Label::Info => Style::Blue,
            Label::Warn => Style::Yellow,
            Label::Error => Style::Red,
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Output handle for a run. The renderer keeps its own copy.
#[derive(Debug, Clone)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Enables colors only for an interactive stdout without `NO_COLOR`.
    pub fn new() -> Self {
        let colors_enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { colors_enabled }
    }

    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    fn line(&self, label: Label, message: &str) -> String {
        format!(
            "[{}] {}",
            self.style(label.text(), &[label.color(), Style::Bold]),
            message
        )
    }

    /// Announces a unit of work, e.g. `Getting Cover.png...`.
    pub fn step(&self, message: &str) {
        println!("{}", self.line(Label::Step, message));
    }

    /// Reports a finished volume or a written document source.
    pub fn success(&self, message: &str) {
        println!("{}", self.line(Label::Ok, message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.line(Label::Info, message));
    }

    /// Reports a problem the run continues past.
    pub fn warning(&self, message: &str) {
        println!("{}", self.line(Label::Warn, message));
    }

    /// Reports the error that ends the run, on stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.line(Label::Error, message));
    }

    /// Opens a block of output: the run banner, then one per volume.
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.style(title, &[Style::Magenta, Style::Bold]));
    }

    /// Secondary text such as `up-to-date`.
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Image, chapter and volume counts.
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }

    /// Output directories and document sources.
    pub fn path(&self, path: &Path) -> String {
        self.style(&path.display().to_string(), &[Style::Cyan])
    }
}
