// Loader settings, loaded from a JSON config file or the embedded default
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{LoaderError, Result};
use crate::services::data_loader::base_path::HostLocation;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoaderSettings {
    /// Explicit directory the CSV files are served from. Skips base path detection.
    pub base_url: Option<String>,
    /// Location of the hosting dashboard page.
    pub page_url: String,
    /// Scripts loaded by the hosting page, in document order.
    pub script_urls: Vec<String>,
    /// Script whose location marks the dashboard root (CSVs live one level above it).
    pub loader_script: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Treat rows whose field count differs from the header as parse errors.
    pub strict_columns: bool,
    pub toast_duration_ms: u64,
    pub toast_fade_ms: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings {
            base_url: None,
            page_url: "http://localhost:8000/index.html".to_string(),
            script_urls: Vec::new(),
            loader_script: "data-loader.js".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("cost-data/", env!("CARGO_PKG_VERSION")).to_string(),
            strict_columns: false,
            toast_duration_ms: 3000,
            toast_fade_ms: 300,
        }
    }
}

impl LoaderSettings {
    pub fn load_default() -> Result<Self> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json_str(config_str)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&config_str)
    }

    pub fn from_json_str(config_str: &str) -> Result<Self> {
        let settings: LoaderSettings = serde_json::from_str(config_str)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_none() && self.page_url.trim().is_empty() {
            return Err(LoaderError::Config(
                "either base_url or page_url must be set".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(LoaderError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.loader_script.trim().is_empty() {
            return Err(LoaderError::Config("loader_script must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn toast_fade(&self) -> Duration {
        Duration::from_millis(self.toast_fade_ms)
    }

    pub fn host_location(&self) -> HostLocation {
        HostLocation {
            base_url: self.base_url.clone(),
            page_url: self.page_url.clone(),
            script_urls: self.script_urls.clone(),
            loader_script: self.loader_script.clone(),
        }
    }
}
