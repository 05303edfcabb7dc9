// CSV parsing and dataset caching
pub mod csv_parser;
pub mod dataset_cache;
