// Filesystem adapter for dashboards opened from disk (file:// pages)
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use url::Url;

use super::Fetcher;
use crate::error::{LoaderError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl FsFetcher {
    fn local_path(url: &str) -> Result<PathBuf> {
        if url.starts_with("file:") {
            let parsed = Url::parse(url).map_err(|_| LoaderError::NotFound {
                url: url.to_string(),
            })?;
            parsed.to_file_path().map_err(|_| LoaderError::NotFound {
                url: url.to_string(),
            })
        } else {
            Ok(PathBuf::from(url))
        }
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let path = Self::local_path(url)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoaderError::NotFound {
                url: url.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
