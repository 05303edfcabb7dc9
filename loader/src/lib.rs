// Loader library root
// Fetches the cost-accounting dashboard's CSV datasets, parses and caches them.

pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod services;

pub use config::LoaderSettings;
pub use error::LoaderError;
pub use services::DataLoader;
