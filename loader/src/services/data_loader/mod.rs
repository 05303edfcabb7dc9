// The data loader context: resolves the base path once, caches parsed datasets
// per filename and exposes one accessor per dashboard dataset.
use once_cell::sync::OnceCell;
use shared::models::{Dataset, DatasetKind};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::LoaderSettings;
use crate::data::csv_parser::CsvDatasetParser;
use crate::data::dataset_cache::DatasetCache;
use crate::error::Result;
use crate::fetch::{DefaultFetcher, Fetcher};

pub mod base_path;
pub mod load_all;
pub mod load_csv;

use base_path::{resolve_base_path, HostLocation};

/// Loader context. Clones share the cache and the resolved base path.
#[derive(Clone)]
pub struct DataLoader {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<CsvDatasetParser>,
    location: Arc<HostLocation>,
    base_path: Arc<OnceCell<String>>,
    cache: Arc<RwLock<DatasetCache>>,
}

impl DataLoader {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        location: HostLocation,
        parser: CsvDatasetParser,
    ) -> Self {
        DataLoader {
            fetcher,
            parser: Arc::new(parser),
            location: Arc::new(location),
            base_path: Arc::new(OnceCell::new()),
            cache: Arc::new(RwLock::new(DatasetCache::new())),
        }
    }

    pub fn from_settings(settings: &LoaderSettings) -> Result<Self> {
        settings.validate()?;
        let fetcher = Arc::new(DefaultFetcher::new(settings)?);
        Ok(Self::with_fetcher(settings, fetcher))
    }

    pub fn with_fetcher(settings: &LoaderSettings, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(
            fetcher,
            settings.host_location(),
            CsvDatasetParser::new(settings.strict_columns),
        )
    }

    /// The directory CSV filenames are resolved against. Computed on first use
    /// and never recomputed for this context.
    pub fn base_path(&self) -> &str {
        self.base_path.get_or_init(|| {
            let resolved = resolve_base_path(&self.location);
            info!(base_path = %resolved, "DataLoader base path resolved");
            resolved
        })
    }

    /// Drops every cached dataset; the next load of each file fetches again.
    /// The resolved base path is kept.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "Dataset cache cleared");
    }

    pub async fn is_cached(&self, filename: &str) -> bool {
        self.cache.read().await.contains(filename)
    }

    pub async fn cached_filenames(&self) -> Vec<String> {
        self.cache.read().await.filenames()
    }

    pub async fn load_kind(&self, kind: DatasetKind) -> Result<Dataset> {
        self.load(kind.filename()).await
    }

    pub async fn load_products(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Products).await
    }

    pub async fn load_materials(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Materials).await
    }

    pub async fn load_suppliers(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Suppliers).await
    }

    pub async fn load_activities(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Activities).await
    }

    pub async fn load_processes(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Processes).await
    }

    pub async fn load_orders(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::Orders).await
    }

    pub async fn load_cost_rates(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::CostRates).await
    }

    pub async fn load_material_consumption(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::MaterialConsumption).await
    }

    pub async fn load_process_consumption(&self) -> Result<Dataset> {
        self.load_kind(DatasetKind::ProcessConsumption).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::{LoaderError, Result};
    use crate::fetch::Fetcher;

    /// In-memory fetcher that serves canned bodies and counts requests per URL.
    #[derive(Default)]
    pub struct MockFetcher {
        responses: HashMap<String, std::result::Result<String, u16>>,
        calls: Mutex<Vec<String>>,
        total: AtomicUsize,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub fn with_status(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), Err(status));
            self
        }

        pub fn calls_for(&self, url: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|called| called.as_str() == url)
                .count()
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.total.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(LoaderError::HttpStatus {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(LoaderError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }
}
