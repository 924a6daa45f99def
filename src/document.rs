//! Document source assembly and change-aware writing.

use crate::images::{Orientation, document_path, file_name};
use crate::markup::Chapter;
use crate::template::Template;
use std::path::Path;

/// Extension of the generated document source.
pub const SOURCE_EXTENSION: &str = "tex";

/// Whether writing the document source changed the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Changed,
    Unchanged,
}

/// Everything needed to assemble one volume's document source.
pub struct Document<'a> {
    pub author: &'a str,
    pub main_title: &'a str,

    /// Illustrations never placed in the text.
    pub leftover_images: &'a [String],
    pub chapters: &'a [Chapter],
}

impl Document<'_> {
    /// Renders the full document source.
    ///
    /// `images_dir` is where mirrored images are read from to pick their
    /// orientation.
    pub fn render(&self, template: &Template, images_dir: &Path, landscape_hint: &str) -> String {
        let mut source = template.preamble(self.author, self.main_title);

        for image in self.leftover_images {
            let orientation = Orientation::of_file(&images_dir.join(file_name(image)));
            source.push_str(&template.image(&document_path(image), orientation.hint(landscape_hint)));
            source.push('\n');
        }

        for chapter in self.chapters {
            source.push_str(&template.chapter_title(&chapter.title));
            for text in &chapter.content {
                source.push_str(text);
                source.push('\n');
            }
        }

        source.push_str(template.peroration());
        source
    }
}

/// File name of a volume's document source.
pub fn source_file_name(title: &str) -> String {
    format!("{}.{}", title, SOURCE_EXTENSION)
}

/// Writes `content` to `path` unless the file already holds exactly it.
pub async fn write_if_changed(path: &Path, content: &str) -> std::io::Result<WriteOutcome> {
    match tokio::fs::read(path).await {
        Ok(existing) if existing == content.as_bytes() => return Ok(WriteOutcome::Unchanged),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    tokio::fs::write(path, content).await?;
    Ok(WriteOutcome::Changed)
}
