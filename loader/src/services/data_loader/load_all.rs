// Bulk load: fan out all nine datasets, fan in with fail-fast semantics
use futures::future::try_join_all;
use shared::models::{DatasetKind, Datasets};
use tokio::time::Instant;
use tracing::{error, info};

use super::DataLoader;
use crate::error::{LoaderError, Result};

impl DataLoader {
    /// Loads every dashboard dataset concurrently.
    ///
    /// The first failure fails the whole call and no partial result is returned.
    /// Loads still in flight at that point keep running in the background (and may
    /// still populate the cache); they are not cancelled.
    pub async fn load_all(&self) -> Result<Datasets> {
        let started = Instant::now();

        let handles: Vec<_> = DatasetKind::ALL
            .into_iter()
            .map(|kind| {
                let loader = self.clone();
                tokio::spawn(async move {
                    loader
                        .load_kind(kind)
                        .await
                        .map(|dataset| (kind, dataset))
                })
            })
            .collect();

        let joined = try_join_all(handles.into_iter().map(|handle| async move { handle.await? }));
        let loaded = match joined.await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "Bulk dataset load failed");
                return Err(e);
            }
        };

        let total_rows: usize = loaded.iter().map(|(_, dataset)| dataset.len()).sum();
        let datasets = Datasets::from_loaded(loaded).ok_or(LoaderError::IncompleteLoad)?;
        info!(
            datasets = DatasetKind::ALL.len(),
            total_rows,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded all datasets"
        );
        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::super::base_path::HostLocation;
    use super::super::test_support::MockFetcher;
    use super::*;
    use crate::data::csv_parser::CsvDatasetParser;
    use std::sync::Arc;

    const BASE: &str = "http://host/dash/";

    fn full_fetcher() -> MockFetcher {
        DatasetKind::ALL.iter().fold(MockFetcher::new(), |fetcher, kind| {
            fetcher.with_body(
                &format!("{}{}", BASE, kind.filename()),
                &format!("dataset,rows\n{},1\n{},2\n", kind.field_name(), kind.field_name()),
            )
        })
    }

    fn loader(fetcher: Arc<MockFetcher>) -> DataLoader {
        DataLoader::new(
            fetcher,
            HostLocation::for_base_url(BASE),
            CsvDatasetParser::default(),
        )
    }

    #[tokio::test]
    async fn test_load_all_returns_every_dataset() {
        let fetcher = Arc::new(full_fetcher());
        let loader = loader(fetcher.clone());

        let datasets = loader.load_all().await.unwrap();
        for (kind, dataset) in datasets.iter() {
            assert_eq!(dataset.len(), 2, "{}", kind);
            assert_eq!(
                dataset[0].get("dataset").and_then(|v| v.as_str()),
                Some(kind.field_name())
            );
        }
        assert_eq!(fetcher.total_calls(), 9);

        // Everything is cached now.
        let again = loader.load_all().await.unwrap();
        assert_eq!(fetcher.total_calls(), 9);
        assert_eq!(again, datasets);
    }

    #[tokio::test]
    async fn test_load_all_fails_when_one_fetch_fails() {
        let failing = format!("{}{}", BASE, DatasetKind::Orders.filename());
        let fetcher = Arc::new(full_fetcher().with_status(&failing, 503));
        let loader = loader(fetcher);

        let err = loader.load_all().await.unwrap_err();
        assert!(matches!(err, LoaderError::HttpStatus { status: 503, .. }));
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_load_all_fails_when_one_dataset_is_malformed() {
        let malformed = format!("{}{}", BASE, DatasetKind::Suppliers.filename());
        let fetcher = full_fetcher().with_body(&malformed, "supplier_id,name,rating\nS01,SKF\n");
        let loader = DataLoader::new(
            Arc::new(fetcher),
            HostLocation::for_base_url(BASE),
            CsvDatasetParser::new(true),
        );

        let err = loader.load_all().await.unwrap_err();
        assert!(err.is_parse_error());
        match err {
            LoaderError::ColumnMismatch {
                filename,
                expected,
                found,
                ..
            } => {
                assert_eq!(filename, DatasetKind::Suppliers.filename());
                assert_eq!((expected, found), (3, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!loader.is_cached(DatasetKind::Suppliers.filename()).await);
    }

    #[tokio::test]
    async fn test_load_all_uses_cached_datasets() {
        let fetcher = Arc::new(full_fetcher());
        let loader = loader(fetcher.clone());

        let products = loader.load_products().await.unwrap();
        let datasets = loader.load_all().await.unwrap();

        assert!(Arc::ptr_eq(&products, &datasets.products));
        assert_eq!(
            fetcher.calls_for(&format!("{}{}", BASE, DatasetKind::Products.filename())),
            1
        );
    }
}
