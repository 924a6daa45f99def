//! Per-volume generation pipeline.
//!
//! For every configured volume: fetch the page, mirror its images, translate
//! the chapters, write the document source and, when it changed, render it.

use crate::config::{Config, Volume};
use crate::console::Console;
use crate::document::{Document, WriteOutcome, source_file_name, write_if_changed};
use crate::fetch::Fetcher;
use crate::images::{IMAGES_DIR, ImageMirror};
use crate::markup::{Page, Translator};
use crate::render::Render;
use crate::settings::Settings;
use crate::template::Template;
use anyhow::{Context, Result};
use std::path::Path;

/// Result of processing one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStatus {
    /// The document source changed and was rendered.
    Generated,

    /// The document source was already current; nothing was rendered.
    UpToDate,
}

/// Runs the volumes of a configuration one after another.
pub struct Pipeline<'a> {
    fetcher: &'a dyn Fetcher,
    renderer: &'a dyn Render,
    template: &'a Template,
    settings: &'a Settings,
    console: &'a Console,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        renderer: &'a dyn Render,
        template: &'a Template,
        settings: &'a Settings,
        console: &'a Console,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            template,
            settings,
            console,
        }
    }

    /// Processes every volume in order, stopping at the first error.
    pub async fn run(&self, config: &Config) -> Result<Vec<VolumeStatus>> {
        let root = self.settings.paths.output_directory.join(&config.main_title);
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create {}", root.display()))?;

        let mut statuses = Vec::with_capacity(config.volumes.len());
        for volume in &config.volumes {
            self.console.section(&volume.title);
            let status = self
                .process_volume(&root, config, volume)
                .await
                .with_context(|| format!("Failed to process volume '{}'", volume.title))?;
            statuses.push(status);
        }

        Ok(statuses)
    }

    /// Generates one volume below `root`.
    pub async fn process_volume(
        &self,
        root: &Path,
        config: &Config,
        volume: &Volume,
    ) -> Result<VolumeStatus> {
        let output_dir = root.join(&volume.title);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let source_file = source_file_name(&volume.title);
        let outcome = self
            .write_source(config, volume, &output_dir, &source_file)
            .await?;

        match outcome {
            WriteOutcome::Changed => {
                self.console.step("Rendering document...");
                self.renderer
                    .render(&output_dir, &source_file)
                    .await
                    .context("Failed to render document")?;
                self.console.success(&format!("{} generated", volume.title));
                Ok(VolumeStatus::Generated)
            }
            WriteOutcome::Unchanged => {
                self.console.info(&format!(
                    "{} {}",
                    volume.title,
                    self.console.muted("up-to-date")
                ));
                Ok(VolumeStatus::UpToDate)
            }
        }
    }

    /// Builds the document source of a volume and writes it if it changed.
    async fn write_source(
        &self,
        config: &Config,
        volume: &Volume,
        output_dir: &Path,
        source_file: &str,
    ) -> Result<WriteOutcome> {
        self.console.step(&format!("Fetching {}...", volume.url));
        let html = self
            .fetcher
            .fetch_volume(volume)
            .await
            .context("Failed to fetch page")?;
        let page = Page::parse(&html);

        let mut images = page.illustrations()?;
        let mut wanted = images.clone();
        for thumbnail in page.thumbnails() {
            if !wanted.contains(&thumbnail) {
                wanted.push(thumbnail);
            }
        }

        let images_dir = output_dir.join(IMAGES_DIR);
        let mirror = ImageMirror::new(
            self.fetcher,
            &self.settings.scraping.image_base_url,
            self.console,
        );
        let downloaded = mirror.mirror(&images_dir, &wanted).await?;
        if downloaded > 0 {
            self.console
                .info(&format!("Downloaded {} image(s)", self.console.count(downloaded)));
        }

        let landscape_hint = &self.settings.render.landscape_hint;
        let translator = Translator::new(self.template, &images_dir, landscape_hint);
        let chapters = page.chapters(&translator, &mut images)?;
        self.console
            .info(&format!("Found {} chapters", self.console.count(chapters.len())));

        let source = Document {
            author: &config.author,
            main_title: &config.main_title,
            leftover_images: &images,
            chapters: &chapters,
        }
        .render(self.template, &images_dir, landscape_hint);

        let path = output_dir.join(source_file);
        let outcome = write_if_changed(&path, &source)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        match outcome {
            WriteOutcome::Changed => self
                .console
                .success(&format!("{} written.", self.console.path(&path))),
            WriteOutcome::Unchanged => self
                .console
                .info(&format!("{} unchanged.", self.console.path(&path))),
        }

        Ok(outcome)
    }
}
