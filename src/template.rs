//! Template store for the generated document source.
//!
//! Four files live in the templates directory:
//! - `latex_template_document`: five whitespace-separated formats (chapter
//!   title, bold, italic, image, centered text)
//! - `latex_template_replace`: one literal substitution per line,
//!   `pattern [replacement]`
//! - `latex_template_preamble`: document head, formatted with the author and
//!   main title
//! - `latex_template_peroration`: document tail, used verbatim
//!
//! Formats use positional brace placeholders: `{}` takes the next argument,
//! `{N}` takes argument `N`, and `{{` / `}}` stand for literal braces.

use crate::error::TemplateError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

pub const DOCUMENT_FILE: &str = "latex_template_document";
pub const REPLACE_FILE: &str = "latex_template_replace";
pub const PREAMBLE_FILE: &str = "latex_template_preamble";
pub const PERORATION_FILE: &str = "latex_template_peroration";

/// Field names of the document file, in file order.
const DOCUMENT_FIELDS: [&str; 5] = ["chapter title", "bold", "italic", "image", "centered"];

/// Matches escaped braces and placeholders.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{(\d*)\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arg(usize),
}

/// A parsed format string with a fixed number of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString {
    segments: Vec<Segment>,
}

impl FormatString {
    /// Parses `source`, rejecting stray braces and placeholders that refer
    /// past `arity` arguments.
    pub fn parse(name: &str, source: &str, arity: usize) -> Result<Self, TemplateError> {
        let bad_format = |message: String| TemplateError::BadFormat {
            name: name.to_string(),
            message,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut next_auto = 0;
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_literal(&source[last..whole.start()], &mut literal).map_err(&bad_format)?;
            last = whole.end();

            match whole.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                _ => {
                    let index = match caps.get(1).map(|m| m.as_str()) {
                        Some(digits) if !digits.is_empty() => digits
                            .parse::<usize>()
                            .map_err(|e| bad_format(format!("bad index {}: {}", digits, e)))?,
                        _ => {
                            next_auto += 1;
                            next_auto - 1
                        }
                    };

                    if index >= arity {
                        return Err(bad_format(format!(
                            "placeholder {} out of range ({} argument(s) available)",
                            index, arity
                        )));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Arg(index));
                }
            }
        }

        push_literal(&source[last..], &mut literal).map_err(&bad_format)?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Substitutes `args` into the format. Missing arguments render empty.
    pub fn render(&self, args: &[&str]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(index) => out.push_str(args.get(*index).copied().unwrap_or_default()),
            }
        }
        out
    }
}

fn push_literal(text: &str, literal: &mut String) -> Result<(), String> {
    if let Some(brace) = text.chars().find(|c| matches!(c, '{' | '}')) {
        return Err(format!("single '{}' encountered", brace));
    }
    literal.push_str(text);
    Ok(())
}

/// Formats and substitutions shared by every volume of a run.
#[derive(Debug, Clone)]
pub struct Template {
    chapter_title: FormatString,
    bold: FormatString,
    italic: FormatString,
    image: FormatString,
    centered: FormatString,
    replacements: Vec<(String, String)>,
    preamble: FormatString,
    peroration: String,
}

impl Template {
    /// Loads the four template files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| TemplateError::ReadError { path, source })
        };

        Self::from_parts(
            &read(DOCUMENT_FILE)?,
            &read(REPLACE_FILE)?,
            &read(PREAMBLE_FILE)?,
            &read(PERORATION_FILE)?,
        )
    }

    /// Builds a template from the contents of the four files.
    pub fn from_parts(
        document: &str,
        replace: &str,
        preamble: &str,
        peroration: &str,
    ) -> Result<Self, TemplateError> {
        let fields: Vec<&str> = document.split_whitespace().collect();
        let &[chapter_title, bold, italic, image, centered] = fields.as_slice() else {
            return Err(TemplateError::MalformedDocument {
                found: fields.len(),
            });
        };

        let [title_name, bold_name, italic_name, image_name, centered_name] = DOCUMENT_FIELDS;

        Ok(Self {
            chapter_title: FormatString::parse(title_name, chapter_title, 1)?,
            bold: FormatString::parse(bold_name, bold, 1)?,
            italic: FormatString::parse(italic_name, italic, 1)?,
            image: FormatString::parse(image_name, image, 2)?,
            centered: FormatString::parse(centered_name, centered, 1)?,
            replacements: parse_replacements(replace),
            preamble: FormatString::parse(PREAMBLE_FILE, preamble, 2)?,
            peroration: peroration.to_string(),
        })
    }

    pub fn chapter_title(&self, title: &str) -> String {
        self.chapter_title.render(&[title])
    }

    pub fn bold(&self, text: &str) -> String {
        self.bold.render(&[text])
    }

    pub fn italic(&self, text: &str) -> String {
        self.italic.render(&[text])
    }

    /// Image insertion; `orientation` is empty for portrait images.
    pub fn image(&self, path: &str, orientation: &str) -> String {
        self.image.render(&[path, orientation])
    }

    pub fn centered(&self, text: &str) -> String {
        self.centered.render(&[text])
    }

    pub fn preamble(&self, author: &str, main_title: &str) -> String {
        self.preamble.render(&[author, main_title])
    }

    pub fn peroration(&self) -> &str {
        &self.peroration
    }

    /// Applies every literal replacement, in file order.
    pub fn apply_replacements(&self, text: &str) -> String {
        self.replacements
            .iter()
            .fold(text.to_string(), |acc, (pattern, replacement)| {
                acc.replace(pattern.as_str(), replacement)
            })
    }
}

/// Parses the replacement table. Only a line of exactly two tokens names its
/// replacement; any other line replaces its first token by a single space.
fn parse_replacements(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let pattern = tokens.next()?;
            let replacement = match (tokens.next(), tokens.next()) {
                (Some(replacement), None) => replacement,
                _ => " ",
            };
            Some((pattern.to_string(), replacement.to_string()))
        })
        .collect()
}
