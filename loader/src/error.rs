use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("HTTP error! status: {status} ({url})")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV parsing error in {filename}: {source}")]
    CsvParse {
        filename: String,
        #[source]
        source: csv::Error,
    },

    #[error(
        "CSV data format error in {filename} at line {line}: \
         expected {expected} fields, found {found}"
    )]
    ColumnMismatch {
        filename: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Load task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Bulk load finished without every dataset")]
    IncompleteLoad,
}

impl LoaderError {
    /// Failures retrieving the resource (bad status, transport, filesystem).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            LoaderError::HttpStatus { .. }
                | LoaderError::Network { .. }
                | LoaderError::NotFound { .. }
                | LoaderError::Io { .. }
        )
    }

    /// Failures turning fetched text into rows.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            LoaderError::CsvParse { .. } | LoaderError::ColumnMismatch { .. }
        )
    }
}

pub type Result<T, E = LoaderError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let status = LoaderError::HttpStatus {
            url: "http://host/a.csv".to_string(),
            status: 404,
        };
        assert!(status.is_fetch_error());
        assert!(!status.is_parse_error());
        assert_eq!(
            status.to_string(),
            "HTTP error! status: 404 (http://host/a.csv)"
        );

        let mismatch = LoaderError::ColumnMismatch {
            filename: "suppliers.csv".to_string(),
            line: 3,
            expected: 4,
            found: 2,
        };
        assert!(mismatch.is_parse_error());
        assert!(!mismatch.is_fetch_error());

        let config = LoaderError::Config("bad".to_string());
        assert!(!config.is_fetch_error() && !config.is_parse_error());
    }
}
