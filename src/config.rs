//! Volume list loading.
//!
//! The volume list is a small plain-text file: the author on the first line,
//! the document title on the second, then one `<url> <volume title>` pair per
//! line. Blank lines are ignored.

use crate::error::ConfigError;
use std::path::Path;

/// One source page and the document generated from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Page URL to fetch.
    pub url: String,

    /// Volume title, used for the output directory and file names.
    pub title: String,
}

/// Parsed volume list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Author interpolated into the preamble.
    pub author: String,

    /// Title of the whole work; also the root output directory.
    pub main_title: String,

    /// Volumes in file order.
    pub volumes: Vec<Volume>,
}

impl Config {
    /// Loads the volume list from a file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parses the volume list from its text content.
    ///
    /// Missing header lines read as empty strings, and every non-blank line
    /// after them is a volume.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();

        let author = lines.next().unwrap_or_default().trim().to_string();
        let main_title = lines.next().unwrap_or_default().trim().to_string();

        let volumes = lines
            .filter(|line| !line.trim().is_empty())
            .map(parse_volume)
            .collect();

        Self {
            author,
            main_title,
            volumes,
        }
    }
}

/// Splits a volume line on its first whitespace run. A line holding only a
/// URL gets an empty title.
fn parse_volume(line: &str) -> Volume {
    let line = line.trim();
    let (url, title) = line
        .split_once(char::is_whitespace)
        .map(|(url, rest)| (url, rest.trim()))
        .unwrap_or((line, ""));

    Volume {
        url: url.to_string(),
        title: title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_volume() {
        let config = Config::parse("A. Author\nTitle\nhttp://example/page1 Vol1\n");

        assert_eq!(config.author, "A. Author");
        assert_eq!(config.main_title, "Title");
        assert_eq!(
            config.volumes,
            vec![Volume {
                url: "http://example/page1".to_string(),
                title: "Vol1".to_string(),
            }]
        );
    }

    #[test]
    fn test_volumes_keep_file_order_and_skip_blank_lines() {
        let content = "  Someone  \n  The Work \n\nhttp://a/1 First Volume\n   \nhttp://a/2\tSecond  \n\n";
        let config = Config::parse(content);

        assert_eq!(config.author, "Someone");
        assert_eq!(config.main_title, "The Work");
        assert_eq!(config.volumes.len(), 2);
        assert_eq!(config.volumes[0].url, "http://a/1");
        assert_eq!(config.volumes[0].title, "First Volume");
        assert_eq!(config.volumes[1].url, "http://a/2");
        assert_eq!(config.volumes[1].title, "Second");
    }

    #[test]
    fn test_title_keeps_inner_whitespace() {
        let config = Config::parse("a\nb\nhttp://x   Volume  1:  Start \n");
        assert_eq!(config.volumes[0].title, "Volume  1:  Start");
    }

    #[test]
    fn test_no_volumes() {
        let config = Config::parse("a\nb\n");
        assert!(config.volumes.is_empty());
    }

    #[test]
    fn test_missing_or_blank_header() {
        let config = Config::parse("\nTitle\nhttp://x/1 One\n");
        assert_eq!(config.author, "");
        assert_eq!(config.main_title, "Title");
        assert_eq!(config.volumes.len(), 1);

        let config = Config::parse("only author\n");
        assert_eq!(config.author, "only author");
        assert_eq!(config.main_title, "");
        assert!(config.volumes.is_empty());

        let config = Config::parse("");
        assert_eq!(config.author, "");
        assert!(config.volumes.is_empty());
    }

    #[test]
    fn test_volume_without_title() {
        let config = Config::parse("a\nb\nhttp://x/1\nhttp://x/2 Two\n");

        assert_eq!(
            config.volumes,
            vec![
                Volume {
                    url: "http://x/1".to_string(),
                    title: String::new(),
                },
                Volume {
                    url: "http://x/2".to_string(),
                    title: "Two".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "Author\nWork\nhttp://x/1 One\nhttp://x/2 Two\n").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.volumes.len(), 2);
        assert_eq!(config.volumes[1].title, "Two");
    }
}
