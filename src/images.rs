//! Local mirror of illustration images.
//!
//! Images are identified by their path below the wiki's image root
//! (e.g. `a/ab/Cover.jpg`) and stored flat under the volume's `images/`
//! directory by file name.

use crate::console::Console;
use crate::error::ImageError;
use crate::fetch::{Fetcher, image_url};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;

/// Directory name of the mirror, relative to the volume output directory.
pub const IMAGES_DIR: &str = "images";

/// Returns the file name part of an image identifier.
pub fn file_name(identifier: &str) -> &str {
    identifier
        .rsplit_once('/')
        .map_or(identifier, |(_, name)| name)
}

/// Path of an image as referenced from the document source.
pub fn document_path(identifier: &str) -> String {
    format!("./{}/{}", IMAGES_DIR, file_name(identifier))
}

/// Downloads images that are not already present locally.
pub struct ImageMirror<'a> {
    fetcher: &'a dyn Fetcher,
    base_url: &'a str,
    console: &'a Console,
}

impl<'a> ImageMirror<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, base_url: &'a str, console: &'a Console) -> Self {
        Self {
            fetcher,
            base_url,
            console,
        }
    }

    /// Ensures `dir` exists and holds every image in `identifiers`.
    ///
    /// Returns the number of images downloaded.
    pub async fn mirror(&self, dir: &Path, identifiers: &[String]) -> Result<usize, ImageError> {
        let io_error = |source: std::io::Error| ImageError::Io {
            path: dir.to_path_buf(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(io_error)?;

        let mut present: HashSet<OsString> = HashSet::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            present.insert(entry.file_name());
        }

        let mut downloaded = 0;
        for identifier in identifiers {
            let name = file_name(identifier);
            if name.is_empty() || !present.insert(OsString::from(name)) {
                continue;
            }

            self.console.step(&format!("Getting {}...", name));
            let url = image_url(self.base_url, identifier)?;
            let bytes = self.fetcher.fetch_bytes(&url).await?;

            let path = dir.join(name);
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|source| ImageError::Io { path, source })?;
            downloaded += 1;
        }

        Ok(downloaded)
    }
}

/// Page orientation of an illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Reads the orientation of an image file. Files that cannot be read or
    /// whose format is unknown count as portrait.
    pub fn of_file(path: &Path) -> Self {
        std::fs::read(path)
            .ok()
            .and_then(|data| image_dimensions(&data))
            .map_or(Orientation::Portrait, |(width, height)| {
                if width > height {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                }
            })
    }

    /// Orientation value for the image format.
    pub fn hint<'h>(self, landscape_hint: &'h str) -> &'h str {
        match self {
            Orientation::Portrait => "",
            Orientation::Landscape => landscape_hint,
        }
    }
}

/// Reads width and height from a PNG, JPEG or GIF header.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // PNG: width/height at bytes 16-23 in IHDR chunk
    if data.len() >= 24 && data.starts_with(&[0x89, b'P', b'N', b'G']) {
        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        return Some((width, height));
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return jpeg_dimensions(data);
    }

    // GIF: logical screen size at bytes 6-9, little-endian
    if data.len() >= 10 && data.starts_with(b"GIF") {
        let width = u16::from_le_bytes([data[6], data[7]]) as u32;
        let height = u16::from_le_bytes([data[8], data[9]]) as u32;
        return Some((width, height));
    }

    None
}

/// Walks JPEG segments up to the first start-of-frame marker.
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof && i + 9 < data.len() {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }

        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) || marker == 0xFF {
            i += if marker == 0xFF { 1 } else { 2 };
            continue;
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + length;
    }

    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::tests::MemoryFetcher;
    use tempfile::TempDir;

    const BASE: &str = "http://img.example/images/";

    /// Minimal PNG header with the given size.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a/ab/Cover.jpg"), "Cover.jpg");
        assert_eq!(file_name("Cover.jpg"), "Cover.jpg");
        assert_eq!(document_path("a/ab/Cover.jpg"), "./images/Cover.jpg");
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(image_dimensions(&png(800, 600)), Some((800, 600)));
    }

    #[test]
    fn test_gif_dimensions() {
        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&320u16.to_le_bytes());
        gif.extend_from_slice(&200u16.to_le_bytes());
        assert_eq!(image_dimensions(&gif), Some((320, 200)));
    }

    #[test]
    fn test_jpeg_dimensions() {
        let mut jpeg = vec![0xFF, 0xD8];
        // APP0 segment of length 4
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        // SOF0: length, precision, height, width
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        jpeg.extend_from_slice(&1200u16.to_be_bytes());
        jpeg.extend_from_slice(&900u16.to_be_bytes());
        jpeg.extend_from_slice(&[0x03, 0x00, 0x00]);
        assert_eq!(image_dimensions(&jpeg), Some((900, 1200)));
    }

    #[test]
    fn test_unknown_format() {
        assert_eq!(image_dimensions(b"not an image at all, really"), None);
    }

    #[test]
    fn test_orientation_of_file() {
        let dir = TempDir::new().unwrap();
        let wide = dir.path().join("wide.png");
        let tall = dir.path().join("tall.png");
        std::fs::write(&wide, png(1000, 700)).unwrap();
        std::fs::write(&tall, png(700, 1000)).unwrap();

        assert_eq!(Orientation::of_file(&wide), Orientation::Landscape);
        assert_eq!(Orientation::of_file(&tall), Orientation::Portrait);
        assert_eq!(Orientation::of_file(&dir.path().join("missing.png")), Orientation::Portrait);
        assert_eq!(Orientation::Landscape.hint("angle=90"), "angle=90");
        assert_eq!(Orientation::Portrait.hint("angle=90"), "");
    }

    #[tokio::test]
    async fn test_mirror_downloads_missing_only() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join(IMAGES_DIR);
        std::fs::create_dir(&images_dir).unwrap();
        std::fs::write(images_dir.join("Old.png"), b"old").unwrap();

        let fetcher = MemoryFetcher::default()
            .with("http://img.example/images/a/ab/New.png", png(1, 2))
            .with("http://img.example/images/c/cd/Old.png", b"fresh".to_vec());
        let console = Console::with_colors(false);
        let mirror = ImageMirror::new(&fetcher, BASE, &console);

        let identifiers = vec!["c/cd/Old.png".to_string(), "a/ab/New.png".to_string()];
        let downloaded = mirror.mirror(&images_dir, &identifiers).await.unwrap();

        assert_eq!(downloaded, 1);
        assert_eq!(
            fetcher.requests(),
            vec!["http://img.example/images/a/ab/New.png".to_string()]
        );
        assert_eq!(std::fs::read(images_dir.join("New.png")).unwrap(), png(1, 2));
        assert_eq!(std::fs::read(images_dir.join("Old.png")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_mirror_creates_directory_and_skips_duplicates() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join(IMAGES_DIR);

        let fetcher = MemoryFetcher::default().with("http://img.example/images/a/ab/P.png", png(3, 3));
        let console = Console::with_colors(false);
        let mirror = ImageMirror::new(&fetcher, BASE, &console);

        let identifiers = vec!["a/ab/P.png".to_string(), "a/ab/P.png".to_string()];
        assert_eq!(mirror.mirror(&images_dir, &identifiers).await.unwrap(), 1);
        assert!(images_dir.join("P.png").exists());

        // Second run finds everything in place
        assert_eq!(mirror.mirror(&images_dir, &identifiers).await.unwrap(), 0);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_mirror_fetch_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::default();
        let console = Console::with_colors(false);
        let mirror = ImageMirror::new(&fetcher, BASE, &console);

        let result = mirror.mirror(dir.path(), &["a/ab/Gone.png".to_string()]).await;
        assert!(matches!(result, Err(ImageError::Fetch(_))));
    }
}
