//! Filesystem data directory operations.
//!
//! Handles reading and writing to the local data directory:
//! - Raw matchup exports (comma-separated)
//! - Derived report snapshots (JSON)

pub mod csv;
pub mod report;

pub use self::csv::{parse_match_records, read_match_records, LoadedDataset};
pub use self::report::{read_report, write_report, DerivedReport};

use std::path::PathBuf;
use thiserror::Error;

use crate::calculate::AggregateError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error(transparent)]
    Malformed(#[from] AggregateError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn derived_dir(&self) -> PathBuf {
        self.data_dir.join("derived")
    }

    /// Path of a named matchup export.
    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        self.raw_dir().join(file_name)
    }

    /// Path of the derived report snapshot.
    pub fn report_path(&self) -> PathBuf {
        self.derived_dir().join("meta_report.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.raw_dir(), PathBuf::from("/data/raw"));
        assert_eq!(config.derived_dir(), PathBuf::from("/data/derived"));
        assert_eq!(
            config.dataset_path("matchups.csv"),
            PathBuf::from("/data/raw/matchups.csv")
        );
        assert_eq!(
            config.report_path(),
            PathBuf::from("/data/derived/meta_report.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
