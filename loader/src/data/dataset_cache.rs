// In-memory cache of parsed datasets, keyed by CSV filename
use shared::models::Dataset;
use std::collections::HashMap;

// No eviction and no expiry: the dashboard reads a small fixed set of files.
pub struct DatasetCache {
    datasets: HashMap<String, Dataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        DatasetCache {
            datasets: HashMap::new(),
        }
    }

    pub fn get(&self, filename: &str) -> Option<Dataset> {
        self.datasets.get(filename).cloned()
    }

    /// Stores `dataset` under `filename`, replacing any previous entry.
    pub fn insert(&mut self, filename: &str, dataset: Dataset) {
        self.datasets.insert(filename.to_string(), dataset);
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.datasets.contains_key(filename)
    }

    pub fn clear(&mut self) {
        self.datasets.clear();
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}
