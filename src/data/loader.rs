// ============================================================
// Layer 4 — Event Log Loader
// ============================================================
// Reads a delimited raw event log with the csv crate.
//
// Expected column layout (RetailRocket `events.csv`):
//
//   timestamp,visitorid,event,itemid[,transactionid...]
//   1433221332117,257597,view,355908,
//
// Only the first four columns are read; extra columns are
// ignored. A row the csv parser cannot read is still reported,
// as an empty RawRecord, so the normaliser counts it as
// malformed instead of the whole load failing.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::traits::{EventSource, RawRecord};

const TIMESTAMP_COLUMN: usize = 0;
const USER_COLUMN: usize = 1;
const EVENT_COLUMN: usize = 2;
const ITEM_COLUMN: usize = 3;

/// Loads raw rows from a delimited file.
/// Implements the EventSource trait from Layer 3.
pub struct CsvEventLoader {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
}

impl CsvEventLoader {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8, has_headers: bool) -> Self {
        Self {
            path: path.into(),
            delimiter,
            has_headers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for CsvEventLoader {
    fn load_all(&self) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open event log '{}'", self.path.display()))?;

        let mut rows = Vec::new();
        let mut unreadable = 0usize;

        for result in reader.records() {
            match result {
                Ok(record) => rows.push(RawRecord {
                    timestamp: record.get(TIMESTAMP_COLUMN).map(str::to_string),
                    user: record.get(USER_COLUMN).map(str::to_string),
                    event: record.get(EVENT_COLUMN).map(str::to_string),
                    item: record.get(ITEM_COLUMN).map(str::to_string),
                }),
                // A broken row is not fatal. Hard I/O errors are.
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| format!("Failed reading '{}'", self.path.display()));
                }
                Err(e) => {
                    tracing::debug!("Unreadable row in '{}': {}", self.path.display(), e);
                    unreadable += 1;
                    rows.push(RawRecord::default());
                }
            }
        }

        if unreadable > 0 {
            tracing::warn!("{} unreadable rows in '{}'", unreadable, self.path.display());
        }
        tracing::info!("Read {} rows from '{}'", rows.len(), self.path.display());
        Ok(rows)
    }
}
