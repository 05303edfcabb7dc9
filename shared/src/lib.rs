pub mod models;
pub mod utils;

// Row/dataset types and the pure helpers are used by the loader crate and by
// any dashboard front end consuming its datasets.
pub use models::{Dataset, DatasetKind, Datasets, Row, Scalar};
