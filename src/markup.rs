//! Translation of a wiki page into document source fragments.
//!
//! Each chapter starts at a `.mw-headline` heading. The first heading is the
//! illustrations section: its following `<ul>` lists the volume's images and
//! it is not emitted as a chapter. A chapter's content is every sibling after
//! its heading up to the next `h2`, `h3` or `table`.

use crate::error::PageError;
use crate::images::{Orientation, document_path, file_name};
use crate::template::Template;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

/// Leading part of a thumbnail `src` that is not part of the identifier.
pub const THUMB_PREFIX: &str = "/project/images/thumb/";

/// Sibling tags that end a chapter.
const STOP_TAGS: [&str; 3] = ["h2", "h3", "table"];

static HEADLINE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".mw-headline").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static THUMB_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".thumbimage").unwrap());

/// A titled section of a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,

    /// Translated fragments, each ending with a line break.
    pub content: Vec<String>,
}

/// Derives an image identifier from a thumbnail `src`.
///
/// `/project/images/thumb/a/ab/Pic.jpg/200px-Pic.jpg` becomes `a/ab/Pic.jpg`.
/// Sources too short to hold the prefix give an empty identifier.
pub fn image_identifier(src: &str) -> &str {
    let end = src.rfind('/').unwrap_or(0);
    src.get(THUMB_PREFIX.len()..end).unwrap_or("")
}

/// A parsed volume page.
pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn headlines(&self) -> Result<Vec<ElementRef<'_>>, PageError> {
        let headlines: Vec<_> = self.document.select(&HEADLINE).collect();
        if headlines.is_empty() {
            return Err(PageError::ElementNotFound("chapter headline".to_string()));
        }
        Ok(headlines)
    }

    /// Image identifiers listed in the illustrations section, in page order.
    pub fn illustrations(&self) -> Result<Vec<String>, PageError> {
        let headlines = self.headlines()?;
        let heading = heading_of(headlines[0])?;

        let list = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "ul")
            .ok_or_else(|| PageError::ElementNotFound("illustration list".to_string()))?;

        Ok(list
            .select(&IMG)
            .filter_map(|img| img.value().attr("src"))
            .map(image_identifier)
            .filter(|identifier| !identifier.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Image identifiers of every thumbnail on the page, in page order.
    pub fn thumbnails(&self) -> Vec<String> {
        self.document
            .select(&THUMB_IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(image_identifier)
            .filter(|identifier| !identifier.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Translates every chapter after the illustrations section.
    ///
    /// Thumbnails placed in the text are removed from `images`, leaving the
    /// illustrations that still need a place in the document.
    pub fn chapters(
        &self,
        translator: &Translator<'_>,
        images: &mut Vec<String>,
    ) -> Result<Vec<Chapter>, PageError> {
        let mut chapters = Vec::new();

        for headline in self.headlines()?.into_iter().skip(1) {
            let heading = heading_of(headline)?;

            let content = heading
                .next_siblings()
                .take_while(|node| !ElementRef::wrap(*node).is_some_and(is_stop))
                .filter_map(ElementRef::wrap)
                .map(|element| translator.translate(element, images))
                .filter(|text| !text.is_empty())
                .collect();

            chapters.push(Chapter {
                title: headline.text().collect::<String>().trim().to_string(),
                content,
            });
        }

        Ok(chapters)
    }
}

fn heading_of(headline: ElementRef<'_>) -> Result<ElementRef<'_>, PageError> {
    headline
        .parent()
        .and_then(ElementRef::wrap)
        .ok_or_else(|| PageError::ElementNotFound("headline heading".to_string()))
}

fn is_stop(element: ElementRef<'_>) -> bool {
    STOP_TAGS.contains(&element.value().name())
}

/// Converts content elements into document source text.
pub struct Translator<'a> {
    template: &'a Template,
    images_dir: &'a Path,
    landscape_hint: &'a str,
}

impl<'a> Translator<'a> {
    pub fn new(template: &'a Template, images_dir: &'a Path, landscape_hint: &'a str) -> Self {
        Self {
            template,
            images_dir,
            landscape_hint,
        }
    }

    /// Translates one content element. Returns an empty string for elements
    /// that produce no text, otherwise the text followed by a line break.
    pub fn translate(&self, element: ElementRef<'_>, images: &mut Vec<String>) -> String {
        let mut text = match element.value().name() {
            "p" => self.paragraph(element),
            "div" => self.thumbnail(element, images),
            "center" => self.centered(element),
            _ => String::new(),
        };

        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn paragraph(&self, element: ElementRef<'_>) -> String {
        let mut text = String::new();

        for child in element.children() {
            match child.value() {
                Node::Text(run) => text.push_str(run.trim()),
                Node::Element(inline) => {
                    let inner = || {
                        ElementRef::wrap(child)
                            .map(|e| e.text().collect::<String>())
                            .unwrap_or_default()
                    };
                    match inline.name() {
                        "b" => text.push_str(&self.template.bold(inner().trim())),
                        "i" => text.push_str(&self.template.italic(inner().trim())),
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        self.template.apply_replacements(&text)
    }

    fn thumbnail(&self, element: ElementRef<'_>, images: &mut Vec<String>) -> String {
        let Some(src) = element
            .select(&THUMB_IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
        else {
            return String::new();
        };

        let identifier = image_identifier(src);
        if identifier.is_empty() {
            return String::new();
        }

        // A second thumbnail of the same image finds it already claimed
        if let Some(pos) = images.iter().position(|image| image == identifier) {
            images.remove(pos);
        }

        let orientation = Orientation::of_file(&self.images_dir.join(file_name(identifier)));
        self.template
            .image(&document_path(identifier), orientation.hint(self.landscape_hint))
    }

    fn centered(&self, element: ElementRef<'_>) -> String {
        let content = match sole_text(element) {
            Some(run) => run.to_string(),
            None => {
                let content: String = element
                    .children()
                    .filter_map(|child| match child.value() {
                        Node::Text(run) => Some(&**run),
                        _ => None,
                    })
                    .collect();
                if content.trim().is_empty() {
                    return String::new();
                }
                content
            }
        };

        self.template
            .apply_replacements(&self.template.centered(&content))
    }
}

/// Text of an element whose only child is a text run, following a chain of
/// single-child elements down to it.
fn sole_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let mut children = element.children();
    let (Some(child), None) = (children.next(), children.next()) else {
        return None;
    };

    match child.value() {
        Node::Text(run) => Some(&**run),
        _ => ElementRef::wrap(child).and_then(sole_text),
    }
}
