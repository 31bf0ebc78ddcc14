/// Timestamped data directories
///
/// Every run of a data-producing script writes into a fresh directory named
/// `<label>_<timestamp>` under the data root. Readers pick the newest one.
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp suffix written by [`DataStore::create_data_path`]
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.6f";

/// Accepts suffixes with or without fractional seconds
const TIMESTAMP_PARSE_FORMAT: &str = "%Y%m%d-%H%M%S%.f";

/// Maps a data label to the newest directory holding that data
///
/// `Ok(None)` means no directory matches; it is an expected outcome, not a
/// failure.
pub trait DataPathResolver {
    fn find_newest_data_path(&self, label: &str) -> Result<Option<PathBuf>>;
}

/// Data directories under a single root
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh `<root>/<label>_<timestamp>` directory
    pub fn create_data_path(&self, label: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create data root: {}", self.root.display())
        })?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let path = self.root.join(format!("{}_{}", label, timestamp));

        // Fails if a run with the same timestamp already exists
        fs::create_dir(&path)
            .with_context(|| format!("Failed to create data path: {}", path.display()))?;

        debug!(label, path = %path.display(), "Created data path");
        Ok(path)
    }

    /// All directories matching `label`, oldest first
    pub fn data_paths(&self, label: &str) -> Result<Vec<(NaiveDateTime, PathBuf)>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", label);
        let mut matches = Vec::new();

        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read data root: {}", self.root.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(suffix) = name.strip_prefix(&prefix) else {
                continue;
            };
            if let Ok(created) = NaiveDateTime::parse_from_str(suffix, TIMESTAMP_PARSE_FORMAT) {
                matches.push((created, entry.path()));
            }
        }

        matches.sort();
        Ok(matches)
    }
}

impl DataPathResolver for DataStore {
    fn find_newest_data_path(&self, label: &str) -> Result<Option<PathBuf>> {
        Ok(self.data_paths(label)?.pop().map(|(_, path)| path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_data_path() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path().join("data"));

        let path = store.create_data_path("results").unwrap();
        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("results_"));

        // The directory it just created is the newest match
        assert_eq!(store.find_newest_data_path("results").unwrap(), Some(path));
    }

    #[test]
    fn test_newest_by_timestamp() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in [
            "scores_0.50_20240101-120000",
            "scores_0.50_20250301-080000.000001",
            "scores_0.50_20241231-235959",
        ] {
            fs::create_dir(root.join(name)).unwrap();
        }

        let store = DataStore::new(root);
        assert_eq!(
            store.find_newest_data_path("scores_0.50").unwrap(),
            Some(root.join("scores_0.50_20250301-080000.000001"))
        );
        assert_eq!(store.data_paths("scores_0.50").unwrap().len(), 3);
    }

    #[test]
    fn test_prefix_of_other_label_does_not_match() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("scores_extra_20240101-120000")).unwrap();
        fs::write(root.join("scores_20240101-120000"), "not a directory").unwrap();

        let store = DataStore::new(root);
        assert_eq!(store.find_newest_data_path("scores").unwrap(), None);
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path().join("does-not-exist"));
        assert_eq!(store.find_newest_data_path("anything").unwrap(), None);
    }
}
