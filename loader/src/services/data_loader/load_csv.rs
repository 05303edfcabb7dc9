// Single-dataset load: cache lookup, fetch, parse, store
use shared::models::Dataset;
use tracing::{debug, error, info};

use super::DataLoader;
use crate::error::Result;

impl DataLoader {
    /// Loads `filename` relative to the base path.
    ///
    /// A cached dataset is returned without I/O. Otherwise the file is fetched,
    /// parsed and stored. Two concurrent first loads of the same file each fetch.
    pub async fn load(&self, filename: &str) -> Result<Dataset> {
        let base_path = self.base_path();

        let cached = self.cache.read().await.get(filename);
        if let Some(dataset) = cached {
            debug!(filename = %filename, rows = dataset.len(), "Dataset cache hit");
            return Ok(dataset);
        }

        let url = format!("{}{}", base_path, filename);
        info!(url = %url, "Loading CSV");

        match self.fetch_and_parse(filename, &url).await {
            Ok(dataset) => {
                self.cache.write().await.insert(filename, dataset.clone());
                info!(filename = %filename, rows = dataset.len(), "Dataset loaded");
                Ok(dataset)
            }
            Err(e) => {
                error!(filename = %filename, url = %url, error = %e, "Failed to load dataset");
                Err(e)
            }
        }
    }

    async fn fetch_and_parse(&self, filename: &str, url: &str) -> Result<Dataset> {
        let text = self.fetcher.fetch_text(url).await?;
        let rows = self.parser.parse(filename, &text)?;
        Ok(rows.into())
    }
}

#[cfg(test)]
mod tests {
    use super::super::base_path::HostLocation;
    use super::super::test_support::MockFetcher;
    use super::*;
    use crate::data::csv_parser::CsvDatasetParser;
    use crate::error::LoaderError;
    use shared::models::Scalar;
    use std::sync::Arc;

    const URL: &str = "http://host/dash/suppliers.csv";
    const SUPPLIERS: &str = "\
supplier_id,supplier_name,lead_time_days
S01,洛阳轴承钢材,15
,,
S02,  ,7
  ,  ,  
";

    fn loader(fetcher: Arc<MockFetcher>, strict: bool) -> DataLoader {
        DataLoader::new(
            fetcher,
            HostLocation::for_base_url("http://host/dash"),
            CsvDatasetParser::new(strict),
        )
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let fetcher = Arc::new(MockFetcher::new().with_body(URL, SUPPLIERS));
        let loader = loader(fetcher.clone(), false);

        let first = loader.load("suppliers.csv").await.unwrap();
        let second = loader.load("suppliers.csv").await.unwrap();

        assert_eq!(fetcher.calls_for(URL), 1);
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let fetcher = Arc::new(MockFetcher::new().with_body(URL, SUPPLIERS));
        let loader = loader(fetcher.clone(), false);

        loader.load("suppliers.csv").await.unwrap();
        assert!(loader.is_cached("suppliers.csv").await);
        loader.clear_cache().await;
        assert!(!loader.is_cached("suppliers.csv").await);
        loader.load("suppliers.csv").await.unwrap();

        assert_eq!(fetcher.calls_for(URL), 2);
        assert_eq!(loader.base_path(), "http://host/dash/");
    }

    #[tokio::test]
    async fn test_blank_rows_filtered() {
        let fetcher = Arc::new(MockFetcher::new().with_body(URL, SUPPLIERS));
        let rows = loader(fetcher, false).load("suppliers.csv").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("lead_time_days"), Some(&Scalar::Number(15.0)));
        assert_eq!(rows[1].get("supplier_id"), Some(&Scalar::from("S02")));
    }

    #[tokio::test]
    async fn test_http_error_is_not_cached() {
        let fetcher = Arc::new(MockFetcher::new().with_status(URL, 500));
        let loader = loader(fetcher.clone(), false);

        let err = loader.load("suppliers.csv").await.unwrap_err();
        assert!(matches!(err, LoaderError::HttpStatus { status: 500, .. }));
        assert!(!loader.is_cached("suppliers.csv").await);

        loader.load("suppliers.csv").await.unwrap_err();
        assert_eq!(fetcher.calls_for(URL), 2);
    }

    #[tokio::test]
    async fn test_parse_error_propagates() {
        let fetcher = Arc::new(MockFetcher::new().with_body(URL, "a,b\n1,2,3\n"));
        let err = loader(fetcher, true)
            .load("suppliers.csv")
            .await
            .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[tokio::test]
    async fn test_arbitrary_filenames_are_accepted() {
        let url = "http://host/dash/extra/notes.csv";
        let fetcher = Arc::new(MockFetcher::new().with_body(url, "k\nv\n"));
        let rows = loader(fetcher, false).load("extra/notes.csv").await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
