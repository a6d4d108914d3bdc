// ============================================================
// Layer 6 — Split Files
// ============================================================
// Reads and writes the tab-separated split format:
//
//   SessionId	Time	ItemId
//   17	1433221332	355908
//   17	1433221410	248676
//
// One row per interaction, ordered by SessionId then Time.
//
// File names used by the pipeline:
//   events_train_full.txt   events_test.txt
//   events_train_tr.txt     events_train_valid.txt
//   events_train_full.<k>.txt, events_test.<k>.txt   (slices)
//   events_buys.txt                                   (side channel)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::data::sequences::SessionSequence;
use crate::domain::interaction::{ItemId, SessionId, SideEvent, Timestamp};
use crate::domain::session::Session;
use crate::domain::traits::SplitSink;

pub const TRAIN_FULL: &str = "events_train_full";
pub const TEST: &str = "events_test";
pub const TRAIN_TR: &str = "events_train_tr";
pub const TRAIN_VALID: &str = "events_train_valid";
pub const BUYS: &str = "events_buys";

/// `<name>.txt`, or `<name>.<slice>.txt` for slice outputs.
pub fn file_name(name: &str, slice: Option<usize>) -> String {
    match slice {
        Some(k) => format!("{name}.{k}.txt"),
        None => format!("{name}.txt"),
    }
}

/// One row of a split file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRow {
    #[serde(rename = "SessionId")]
    pub session_id: SessionId,
    #[serde(rename = "Time")]
    pub time: Timestamp,
    #[serde(rename = "ItemId")]
    pub item_id: ItemId,
}

/// Writes split files into one directory.
/// Implements the SplitSink trait from Layer 3.
pub struct TsvSplitWriter {
    dir: PathBuf,
}

impl TsvSplitWriter {
    /// Create the writer, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_rows(&self, name: &str, mut rows: Vec<SplitRow>) -> Result<PathBuf> {
        // Stable, so equal times keep their in-session order
        rows.sort_by_key(|r| (r.session_id, r.time));

        let path = self.dir.join(name);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;

        // serialize() only emits the header with the first row
        if rows.is_empty() {
            writer
                .write_record(["SessionId", "Time", "ItemId"])
                .with_context(|| format!("Cannot write header to '{}'", path.display()))?;
        }
        for row in &rows {
            writer
                .serialize(row)
                .with_context(|| format!("Cannot write to '{}'", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Cannot flush '{}'", path.display()))?;

        tracing::debug!("Wrote {} rows to '{}'", rows.len(), path.display());
        Ok(path)
    }
}

impl SplitSink for TsvSplitWriter {
    fn write_sessions(&self, name: &str, sessions: &[Session]) -> Result<PathBuf> {
        let rows = sessions
            .iter()
            .flat_map(|s| {
                s.events().iter().map(move |e| SplitRow {
                    session_id: s.id,
                    time: e.timestamp,
                    item_id: e.item_id,
                })
            })
            .collect();
        self.write_rows(name, rows)
    }

    fn write_side_events(&self, name: &str, events: &[SideEvent]) -> Result<PathBuf> {
        let rows = events
            .iter()
            .map(|e| SplitRow {
                session_id: e.session_id,
                time: e.timestamp,
                item_id: e.item_id,
            })
            .collect();
        self.write_rows(name, rows)
    }
}

/// Read a split file back as per-session item sequences, in
/// SessionId order.
pub fn read_sequences(path: &Path) -> Result<Vec<SessionSequence>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Cannot open split file '{}'", path.display()))?;

    let mut rows: Vec<SplitRow> = reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Malformed split file '{}'", path.display()))?;
    rows.sort_by_key(|r| (r.session_id, r.time));

    let mut sequences: Vec<SessionSequence> = Vec::new();
    for row in rows {
        match sequences.last_mut() {
            Some(seq) if seq.session_id == row.session_id => seq.items.push(row.item_id),
            _ => sequences.push(SessionSequence {
                session_id: row.session_id,
                items: vec![row.item_id],
            }),
        }
    }
    Ok(sequences)
}
