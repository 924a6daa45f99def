//! Remote fetching of wiki pages and illustration images.
//!
//! The pipeline only talks to the network through the [`Fetcher`] trait,
//! so tests can serve pages and images from memory.

use crate::config::Volume;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for anything that can serve pages and raw files by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page as text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches a file as raw bytes.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetches the HTML page of a volume.
    async fn fetch_volume(&self, volume: &Volume) -> Result<String, FetchError> {
        self.fetch_text(&volume.url).await
    }
}

/// Fetcher backed by a reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay_sec: f64,
}

impl HttpFetcher {
    /// Creates a fetcher that waits `delay_sec` seconds before each request.
    pub fn new(delay_sec: f64) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_http_client()?,
            delay_sec,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        rate_limit(self.delay_sec).await;

        let response = self.client.get(url).send().await?;
        Ok(response.error_for_status()?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

/// Common HTTP client configuration.
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

/// Builds the remote URL of an image from its identifier.
///
/// The base URL must end with `/`; the identifier is appended to it.
pub fn image_url(base_url: &str, identifier: &str) -> Result<String, FetchError> {
    let base = url::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    base.join(identifier)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", identifier, e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher that records every requested URL.
    #[derive(Default)]
    pub(crate) struct MemoryFetcher {
        pub(crate) files: HashMap<String, Vec<u8>>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl MemoryFetcher {
        pub(crate) fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.files.insert(url.to_string(), body.into());
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MemoryFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            let bytes = self.fetch_bytes(url).await?;
            String::from_utf8(bytes).map_err(|e| FetchError::InvalidUrl(e.to_string()))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::InvalidUrl(format!("no such file: {}", url)))
        }
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("http://www.baka-tsuki.org/project/images/", "a/ab/Pic.jpg").unwrap(),
            "http://www.baka-tsuki.org/project/images/a/ab/Pic.jpg"
        );
    }

    #[test]
    fn test_image_url_bad_base() {
        assert!(matches!(
            image_url("not a url", "a/ab/Pic.jpg"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_volume_uses_volume_url() {
        let fetcher = MemoryFetcher::default().with("http://x/1", "<html></html>");
        let volume = Volume {
            url: "http://x/1".to_string(),
            title: "One".to_string(),
        };

        assert_eq!(fetcher.fetch_volume(&volume).await.unwrap(), "<html></html>");
        assert_eq!(fetcher.requests(), vec!["http://x/1".to_string()]);
    }
}
