//! Derived report snapshots.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{StorageConfig, StorageError};
use crate::models::{AggregationResult, DatasetId};

/// An aggregation result stamped with the dataset it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedReport {
    /// Fingerprint of the raw export
    pub dataset_id: DatasetId,

    /// When the aggregation ran
    pub computed_at: DateTime<Utc>,

    /// Export file name the records were read from
    pub source: String,

    pub result: AggregationResult,
}

impl DerivedReport {
    pub fn new(dataset_id: DatasetId, source: String, result: AggregationResult) -> Self {
        Self {
            dataset_id,
            computed_at: Utc::now(),
            source,
            result,
        }
    }
}

/// Write the snapshot, replacing any previous one.
pub fn write_report(config: &StorageConfig, report: &DerivedReport) -> Result<(), StorageError> {
    let path = config.report_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;

    info!(
        "Wrote report for dataset {} ({} decks) to {:?}",
        report.dataset_id,
        report.result.deck_count(),
        path
    );
    Ok(())
}

/// Read the snapshot, or `None` when none has been written yet.
pub fn read_report(config: &StorageConfig) -> Result<Option<DerivedReport>, StorageError> {
    let path = config.report_path();
    if !path.exists() {
        return Ok(None);
    }

    let reader = BufReader::new(File::open(&path)?);
    Ok(Some(serde_json::from_reader(reader)?))
}
