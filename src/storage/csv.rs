//! Comma-separated matchup exports.
//!
//! One header row, then one row per matchup sample:
//! `deck1, deck2, wins, losses, ties, total, win_rate`.
//! Columns are matched by header name. The four counts are unsigned
//! integers, `win_rate` is a percentage from 0 to 100, and an empty
//! `ties` cell reads as zero.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use super::StorageError;
use crate::calculate::AggregateError;
use crate::models::{DatasetId, MatchDataset, MatchRecord};

const REQUIRED_COLUMNS: [&str; 6] = ["deck1", "deck2", "wins", "losses", "total", "win_rate"];

/// One row exactly as the export types it.
#[derive(Debug, Deserialize)]
struct MatchRow {
    deck1: String,
    deck2: String,
    wins: u32,
    losses: u32,
    #[serde(default)]
    ties: Option<u32>,
    total: u32,
    win_rate: f64,
}

impl MatchRow {
    fn into_record(self) -> Result<MatchRecord, String> {
        let record = MatchRecord {
            deck_a: self.deck1.trim().to_string(),
            deck_b: self.deck2.trim().to_string(),
            wins: self.wins,
            losses: self.losses,
            ties: self.ties.unwrap_or(0),
            total: self.total,
            win_rate: self.win_rate,
        };
        record.validate()?;
        Ok(record)
    }
}

/// A dataset read from disk together with its content fingerprint.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub id: DatasetId,
    pub dataset: MatchDataset,
}

/// Parse matchup rows from any reader.
///
/// Malformed rows are skipped and counted unless `strict` is set, in which
/// case the first one is returned as [`AggregateError::MalformedRecord`].
pub fn parse_match_records<R: Read>(reader: R, strict: bool) -> Result<MatchDataset, StorageError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(AggregateError::MalformedRecord {
            line: 1,
            reason: format!("missing column '{}'", missing),
        }
        .into());
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                reject(strict, line, e.to_string(), &mut skipped)?;
                continue;
            }
        };

        let line = row.position().map(|p| p.line() as usize).unwrap_or(0);
        match parse_row(&row, &headers) {
            Ok(record) => records.push(record),
            Err(reason) => reject(strict, line, reason, &mut skipped)?,
        }
    }

    debug!(
        "Parsed {} match records ({} skipped)",
        records.len(),
        skipped
    );
    Ok(MatchDataset::new(records, skipped))
}

/// Read and fingerprint a matchup export file.
pub fn read_match_records(path: &Path, strict: bool) -> Result<LoadedDataset, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let id = DatasetId::from_bytes(&bytes);
    let dataset = parse_match_records(bytes.as_slice(), strict)?;

    debug!("Read dataset {} from {:?}", id, path);
    Ok(LoadedDataset { id, dataset })
}

fn parse_row(row: &StringRecord, headers: &StringRecord) -> Result<MatchRecord, String> {
    let parsed: MatchRow = row.deserialize(Some(headers)).map_err(|e| e.to_string())?;
    parsed.into_record()
}

fn reject(
    strict: bool,
    line: usize,
    reason: String,
    skipped: &mut usize,
) -> Result<(), StorageError> {
    if strict {
        return Err(AggregateError::MalformedRecord { line, reason }.into());
    }
    warn!("Skipping malformed row at line {}: {}", line, reason);
    *skipped += 1;
    Ok(())
}
