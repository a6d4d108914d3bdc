// ============================================================
// Layer 3 — Session Domain Type
// ============================================================
// A session is one user's run of interactions with no internal
// gap larger than the session threshold.
//
//   Session 7 (user 42)
//     t=1000  item 5
//     t=1060  item 9     ← gap 60s
//     t=1300  item 5     ← gap 240s
//
// Sessions are created once by the sessionizer. Filters keep or
// discard whole sessions; when a filter has to remove events it
// builds a new Session with the same id via `retain_events`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::interaction::{InteractionRecord, ItemId, SessionId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// Ascending by timestamp, never empty.
    events: Vec<InteractionRecord>,
}

impl Session {
    /// Build a session from events already ordered by timestamp.
    ///
    /// Returns `None` for an empty event list so an empty session
    /// can never exist.
    pub fn new(id: SessionId, user_id: UserId, events: Vec<InteractionRecord>) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        debug_assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Some(Self { id, user_id, events })
    }

    pub fn events(&self) -> &[InteractionRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the first event.
    pub fn start(&self) -> Timestamp {
        self.events[0].timestamp
    }

    /// Timestamp of the last event. Every temporal split keys on this.
    pub fn end(&self) -> Timestamp {
        self.events[self.events.len() - 1].timestamp
    }

    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.events.iter().map(|e| e.item_id)
    }

    /// A copy of this session holding only the events that pass
    /// `keep`. `None` when nothing is left.
    pub fn retain_events<F>(&self, keep: F) -> Option<Self>
    where
        F: Fn(&InteractionRecord) -> bool,
    {
        let events: Vec<InteractionRecord> = self.events.iter().copied().filter(|e| keep(e)).collect();
        Self::new(self.id, self.user_id, events)
    }
}

/// The distinct items across a set of sessions.
pub fn item_set(sessions: &[Session]) -> HashSet<ItemId> {
    sessions.iter().flat_map(|s| s.items()).collect()
}

/// Latest session end in the set, `None` when empty.
pub fn max_end(sessions: &[Session]) -> Option<Timestamp> {
    sessions.iter().map(Session::end).max()
}

/// Earliest session start in the set, `None` when empty.
pub fn min_start(sessions: &[Session]) -> Option<Timestamp> {
    sessions.iter().map(Session::start).min()
}

/// Total number of events across sessions.
pub fn event_count(sessions: &[Session]) -> usize {
    sessions.iter().map(Session::len).sum()
}
