// Service layer: the data loader context used by dashboard pages
pub mod data_loader;

pub use data_loader::DataLoader;
