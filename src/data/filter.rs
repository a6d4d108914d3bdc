// ============================================================
// Layer 4 — Support Filter
// ============================================================
// Removes sessions that are too short and items that are too
// rare. Removing items can shrink a session below the minimum
// length, and removing a session lowers item supports, so the
// rules are re-applied until nothing changes.
//
// One pass:
//   (a) drop sessions with len < min_session_length
//   (b) count item supports over what is left,
//       drop events of items with support < min_item_support
//   (c) drop sessions that fell below min_session_length
//
// Supports and lengths are rebuilt from scratch every pass.
//
// The loop ends because each pass either removes at least one
// event or leaves the set unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::error::ConfigError;
use crate::domain::interaction::ItemId;
use crate::domain::session::{event_count, Session};

/// How far the filter goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterMode {
    /// Repeat passes until a pass removes nothing.
    FixedPoint,
    /// The historical bounded variant: drop singleton sessions,
    /// drop rare items, drop short sessions, once. Can leave items
    /// below the support threshold.
    TwoPass,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedPoint => "fixed-point",
            Self::TwoPass => "two-pass",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed-point" | "fixed_point" => Ok(Self::FixedPoint),
            "two-pass" | "two_pass" => Ok(Self::TwoPass),
            other => Err(ConfigError::UnknownFilterMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for FilterMode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FilterMode> for String {
    fn from(mode: FilterMode) -> Self {
        mode.as_str().to_string()
    }
}

pub struct SupportFilter {
    min_session_length: usize,
    min_item_support: usize,
    mode: FilterMode,
}

impl SupportFilter {
    pub fn new(min_session_length: usize, min_item_support: usize, mode: FilterMode) -> Self {
        Self {
            min_session_length,
            min_item_support,
            mode,
        }
    }

    /// Filter `sessions`, consuming the input snapshot and returning
    /// a new one.
    pub fn apply(&self, sessions: Vec<Session>) -> Vec<Session> {
        match self.mode {
            FilterMode::FixedPoint => self.fixed_point(sessions),
            FilterMode::TwoPass => {
                let sessions = drop_short_sessions(sessions, 2);
                let sessions = drop_rare_items(sessions, self.min_item_support);
                drop_short_sessions(sessions, self.min_session_length)
            }
        }
    }

    fn fixed_point(&self, mut sessions: Vec<Session>) -> Vec<Session> {
        let mut passes = 0usize;

        loop {
            passes += 1;
            let before = event_count(&sessions);

            sessions = drop_short_sessions(sessions, self.min_session_length);
            sessions = drop_rare_items(sessions, self.min_item_support);
            sessions = drop_short_sessions(sessions, self.min_session_length);

            if event_count(&sessions) == before {
                break;
            }
        }

        tracing::debug!(
            "Support filter converged after {} pass(es): {} sessions left",
            passes,
            sessions.len()
        );
        sessions
    }
}

/// Count how many events each item has across `sessions`.
pub fn item_supports(sessions: &[Session]) -> HashMap<ItemId, usize> {
    let mut supports = HashMap::new();
    for item in sessions.iter().flat_map(|s| s.items()) {
        *supports.entry(item).or_insert(0) += 1;
    }
    supports
}

fn drop_short_sessions(sessions: Vec<Session>, min_len: usize) -> Vec<Session> {
    sessions.into_iter().filter(|s| s.len() >= min_len).collect()
}

fn drop_rare_items(sessions: Vec<Session>, min_support: usize) -> Vec<Session> {
    let supports = item_supports(&sessions);
    let keep = |item: &ItemId| supports.get(item).copied().unwrap_or(0) >= min_support;

    if supports.values().all(|&n| n >= min_support) {
        return sessions;
    }

    sessions
        .iter()
        .filter_map(|s| s.retain_events(|e| keep(&e.item_id)))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::{InteractionRecord, SessionId};
    use proptest::prelude::*;

    fn session(id: SessionId, items: &[ItemId]) -> Session {
        let events = items
            .iter()
            .enumerate()
            .map(|(i, &item)| InteractionRecord::view(id, item, i as i64))
            .collect();
        Session::new(id, id, events).unwrap()
    }

    fn ids(sessions: &[Session]) -> Vec<SessionId> {
        sessions.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_drops_short_session_without_touching_items() {
        // A=1, B=2. B has support 2, A has support 3.
        let sessions = vec![session(1, &[1, 2]), session(2, &[1]), session(3, &[2, 1])];
        let out = SupportFilter::new(2, 2, FilterMode::FixedPoint).apply(sessions.clone());

        assert_eq!(ids(&out), vec![1, 3]);
        assert_eq!(out[0], sessions[0]);
        assert_eq!(out[1], sessions[2]);

        let supports = item_supports(&out);
        assert_eq!(supports[&1], 2);
        assert_eq!(supports[&2], 2);
    }

    #[test]
    fn test_cascade_needs_more_than_two_passes() {
        // Item 9 is rare → session 1 shrinks to [5] and is dropped
        // → item 5 falls to support 1 → session 2 shrinks and goes.
        let sessions = vec![session(1, &[5, 9]), session(2, &[5, 7]), session(3, &[7, 7])];
        let out = SupportFilter::new(2, 2, FilterMode::FixedPoint).apply(sessions);

        assert_eq!(ids(&out), vec![3]);
    }

    #[test]
    fn test_two_pass_can_leave_rare_items() {
        let sessions = vec![session(1, &[5, 9]), session(2, &[5, 7]), session(3, &[7, 7])];
        let out = SupportFilter::new(2, 2, FilterMode::TwoPass).apply(sessions);

        // Session 2 survives with item 5, whose support is now 1
        assert_eq!(ids(&out), vec![2, 3]);
        assert_eq!(item_supports(&out)[&5], 1);
    }

    #[test]
    fn test_impossible_thresholds_give_empty_output() {
        let sessions = vec![session(1, &[1, 2]), session(2, &[1, 2])];
        let out = SupportFilter::new(5, 1, FilterMode::FixedPoint).apply(sessions);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let out = SupportFilter::new(2, 5, FilterMode::FixedPoint).apply(Vec::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_filter_mode_parsing() {
        assert_eq!("two-pass".parse::<FilterMode>(), Ok(FilterMode::TwoPass));
        assert!("sometimes".parse::<FilterMode>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_fixed_point_guarantees_and_idempotence(
            raw in proptest::collection::vec(proptest::collection::vec(0u64..12, 1..6), 0..40),
            min_len in 1usize..4,
            min_support in 1usize..5,
        ) {
            let sessions: Vec<_> = raw
                .iter()
                .enumerate()
                .map(|(i, items)| session(i as u64, items))
                .collect();
            let filter = SupportFilter::new(min_len, min_support, FilterMode::FixedPoint);
            let out = filter.apply(sessions);

            for s in &out {
                prop_assert!(s.len() >= min_len);
            }
            for (_, n) in item_supports(&out) {
                prop_assert!(n >= min_support);
            }

            let again = filter.apply(out.clone());
            prop_assert_eq!(again, out);
        }
    }
}
