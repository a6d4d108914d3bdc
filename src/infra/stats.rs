// ============================================================
// Layer 6 — Dataset Statistics
// ============================================================
// Summarises a session set after every stage so a run can be
// followed in the logs:
//
//   Filtered data set
//       Events: 1034520  Sessions: 289414  Items: 51463
//       Span: 2015-05-03 / 2015-09-18
//
// The same numbers go into summary.json for each written file.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::interaction::{SideEvent, Timestamp};
use crate::domain::session::{event_count, item_set, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub events: usize,
    pub sessions: usize,
    pub items: usize,
    /// Earliest event time, `None` for an empty set
    pub first: Option<Timestamp>,
    /// Latest event time, `None` for an empty set
    pub last: Option<Timestamp>,
}

impl DatasetStats {
    pub fn of(sessions: &[Session]) -> Self {
        Self {
            events: event_count(sessions),
            sessions: sessions.len(),
            items: item_set(sessions).len(),
            first: sessions.iter().map(Session::start).min(),
            last: sessions.iter().map(Session::end).max(),
        }
    }

    /// Statistics of side-channel rows, counting distinct session ids.
    pub fn of_side_events(events: &[SideEvent]) -> Self {
        Self {
            events: events.len(),
            sessions: events.iter().map(|e| e.session_id).collect::<HashSet<_>>().len(),
            items: events.iter().map(|e| e.item_id).collect::<HashSet<_>>().len(),
            first: events.iter().map(|e| e.timestamp).min(),
            last: events.iter().map(|e| e.timestamp).max(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Emit the statistics at info level under `label`.
    pub fn log(&self, label: &str) {
        tracing::info!("{}\n\t{}", label, self);
    }
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Events: {}  Sessions: {}  Items: {}  Span: {} / {}",
            self.events,
            self.sessions,
            self.items,
            iso_date(self.first),
            iso_date(self.last)
        )
    }
}

/// `YYYY-MM-DD` in UTC, or `-` when there is no timestamp.
pub fn iso_date(ts: Option<Timestamp>) -> String {
    ts.and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|| "-".to_string())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::InteractionRecord;

    #[test]
    fn test_stats_of_sessions() {
        let sessions = vec![
            Session::new(0, 1, vec![InteractionRecord::view(1, 5, 1_441_152_000), InteractionRecord::view(1, 6, 1_441_152_100)]).unwrap(),
            Session::new(1, 2, vec![InteractionRecord::view(2, 5, 1_441_300_000)]).unwrap(),
        ];
        let stats = DatasetStats::of(&sessions);

        assert_eq!(stats.events, 3);
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.items, 2);
        assert_eq!(iso_date(stats.first), "2015-09-02");
        assert_eq!(iso_date(stats.last), "2015-09-03");
    }

    #[test]
    fn test_side_event_stats() {
        let events = vec![
            SideEvent { session_id: 1, timestamp: 10, item_id: 3 },
            SideEvent { session_id: 1, timestamp: 30, item_id: 4 },
            SideEvent { session_id: 2, timestamp: 20, item_id: 3 },
        ];
        let stats = DatasetStats::of_side_events(&events);
        assert_eq!((stats.events, stats.sessions, stats.items), (3, 2, 2));
        assert_eq!((stats.first, stats.last), (Some(10), Some(30)));
    }

    #[test]
    fn test_empty_stats() {
        let stats = DatasetStats::of(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.to_string(), "Events: 0  Sessions: 0  Items: 0  Span: - / -");
    }
}
