// Fetch port: retrieves CSV text for a resolved URL
use async_trait::async_trait;

use crate::config::LoaderSettings;
use crate::error::Result;

pub mod fs;
pub mod http;

pub use fs::FsFetcher;
pub use http::HttpFetcher;

/// Source of raw CSV text. A non-success response must be reported as an error,
/// never as an empty body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Routes `http(s)://` URLs to [`HttpFetcher`] and everything else to [`FsFetcher`].
pub struct DefaultFetcher {
    http: HttpFetcher,
    fs: FsFetcher,
}

impl DefaultFetcher {
    pub fn new(settings: &LoaderSettings) -> Result<Self> {
        Ok(DefaultFetcher {
            http: HttpFetcher::new(settings)?,
            fs: FsFetcher,
        })
    }
}

pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        if is_http_url(url) {
            self.http.fetch_text(url).await
        } else {
            self.fs.fetch_text(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://localhost:8000/a.csv"));
        assert!(is_http_url("HTTPS://host/a.csv"));
        assert!(!is_http_url("file:///srv/a.csv"));
        assert!(!is_http_url("/srv/a.csv"));
    }

    #[tokio::test]
    async fn test_default_fetcher_routes_local_paths() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a,b\n1,2\n").unwrap();
        let fetcher = DefaultFetcher::new(&LoaderSettings::default()).unwrap();
        let text = fetcher
            .fetch_text(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(text, "a,b\n1,2\n");
    }
}
