// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline talks to the outside world through two seams:
//
//   EventSource  — anything that yields raw interaction rows
//                  (a delimited file today, an in-memory Vec in tests)
//   SplitSink    — anything that can persist a set of sessions or
//                  side-channel rows under a file name
//
// The application layer only sees these traits, so the data
// stages never touch the filesystem directly.

use anyhow::Result;
use std::path::PathBuf;

use crate::domain::interaction::SideEvent;
use crate::domain::session::Session;

// ─── RawRecord ────────────────────────────────────────────────────────────────
/// One unparsed row of the raw event log.
///
/// Every field is optional: a source reports what it found and the
/// normaliser decides whether the row is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub timestamp: Option<String>,
    pub user: Option<String>,
    pub event: Option<String>,
    pub item: Option<String>,
}

impl RawRecord {
    pub fn new(
        timestamp: impl Into<String>,
        user: impl Into<String>,
        event: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            user: Some(user.into()),
            event: Some(event.into()),
            item: Some(item.into()),
        }
    }
}

// ─── EventSource ──────────────────────────────────────────────────────────────
/// Any component that can produce raw interaction rows.
///
/// Implementations:
///   - CsvEventLoader → reads a delimited events file
///   - Vec<RawRecord> → in-memory rows, used by tests and callers
///                      that already hold the log
pub trait EventSource {
    fn load_all(&self) -> Result<Vec<RawRecord>>;
}

impl EventSource for Vec<RawRecord> {
    fn load_all(&self) -> Result<Vec<RawRecord>> {
        Ok(self.clone())
    }
}

// ─── SplitSink ────────────────────────────────────────────────────────────────
/// Any component that can persist split outputs.
///
/// Implementations:
///   - TsvSplitWriter → one tab-separated file per split
pub trait SplitSink {
    /// Persist `sessions` under `name`, returning where they went.
    fn write_sessions(&self, name: &str, sessions: &[Session]) -> Result<PathBuf>;

    /// Persist side-channel rows under `name`.
    fn write_side_events(&self, name: &str, events: &[SideEvent]) -> Result<PathBuf>;
}
