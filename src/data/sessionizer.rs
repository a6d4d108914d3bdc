// ============================================================
// Layer 4 — Sessionizer
// ============================================================
// Groups each user's interactions into sessions on an
// inactivity gap.
//
// Example with gap = 1800s, one user:
//
//   t:     0   100        2000  2100  2200
//          └─A─┘           └────B─────┘
//               gap 1900 > 1800 → new session
//
// Session ids are global, not per user. Sessions are numbered
// from 0 in order of (start time, user id, position of their
// first record in the input), so the same input always gets the
// same ids.

use crate::data::normalizer::{EventRouting, Route};
use crate::domain::interaction::{InteractionRecord, SideEvent, Timestamp, UserId};
use crate::domain::session::Session;

/// Default inactivity gap: 30 minutes.
pub const DEFAULT_SESSION_GAP: Timestamp = 30 * 60;

pub struct Sessionizer {
    gap: Timestamp,
}

/// A session under construction, before its id is known.
struct Run {
    user_id: UserId,
    first_index: usize,
    events: Vec<InteractionRecord>,
}

impl Sessionizer {
    pub fn new(gap: Timestamp) -> Self {
        Self { gap }
    }

    /// Split `records` into sessions, sorted by session id.
    ///
    /// Input order does not matter beyond tie-breaking: records are
    /// stably sorted by (user, timestamp) first.
    pub fn sessionize(&self, records: &[InteractionRecord]) -> Vec<Session> {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by_key(|&i| (records[i].user_id, records[i].timestamp));

        let mut runs: Vec<Run> = Vec::new();
        let mut previous: Option<&InteractionRecord> = None;

        for &i in &order {
            let record = &records[i];
            let continues = previous.map_or(false, |p| {
                p.user_id == record.user_id && record.timestamp.abs_diff(p.timestamp) <= self.gap.unsigned_abs()
            });

            match runs.last_mut() {
                Some(run) if continues => run.events.push(*record),
                _ => runs.push(Run {
                    user_id: record.user_id,
                    first_index: i,
                    events: vec![*record],
                }),
            }
            previous = Some(record);
        }

        runs.sort_by_key(|r| (r.events[0].timestamp, r.user_id, r.first_index));

        let sessions: Vec<Session> = runs
            .into_iter()
            .zip(0u64..)
            .filter_map(|(run, id)| Session::new(id, run.user_id, run.events))
            .collect();

        tracing::debug!(
            "Sessionized {} records into {} sessions (gap {}s)",
            records.len(),
            sessions.len(),
            self.gap
        );
        sessions
    }
}

/// Pull side-channel events out of the sessions.
///
/// Returns the sessions rebuilt from their primary events only
/// (sessions with none left disappear) and the side events in
/// session order.
pub fn split_side_channel(sessions: Vec<Session>, routing: &EventRouting) -> (Vec<Session>, Vec<SideEvent>) {
    let mut side = Vec::new();
    let mut primary = Vec::with_capacity(sessions.len());

    for session in sessions {
        side.extend(
            session
                .events()
                .iter()
                .filter(|e| routing.route(e.event_type) == Route::Side)
                .map(|e| SideEvent {
                    session_id: session.id,
                    timestamp: e.timestamp,
                    item_id: e.item_id,
                }),
        );
        if let Some(kept) = session.retain_events(|e| routing.route(e.event_type) == Route::Primary) {
            primary.push(kept);
        }
    }

    (primary, side)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::EventType;
    use proptest::prelude::*;

    #[test]
    fn test_gap_starts_new_session() {
        let records: Vec<_> = [0, 100, 2000, 2100, 2200]
            .iter()
            .map(|&t| InteractionRecord::view(1, 10, t))
            .collect();
        let sessions = Sessionizer::new(1800).sessionize(&records);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].len(), 2);
        assert_eq!(sessions[1].len(), 3);
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_in_session() {
        let records = vec![InteractionRecord::view(1, 1, 0), InteractionRecord::view(1, 2, 1800)];
        assert_eq!(Sessionizer::new(1800).sessionize(&records).len(), 1);
    }

    #[test]
    fn test_users_never_share_a_session() {
        // Same timestamps, different users
        let records = vec![InteractionRecord::view(1, 1, 10), InteractionRecord::view(2, 1, 11)];
        let sessions = Sessionizer::new(1800).sessionize(&records);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_singleton_user_forms_session_of_one() {
        let records = vec![InteractionRecord::view(7, 1, 500)];
        let sessions = Sessionizer::new(1800).sessionize(&records);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 1);
    }

    #[test]
    fn test_ids_follow_start_time_then_user() {
        // User 2 starts earlier than user 1, so gets id 0.
        // Users 3 and 4 start together, user 3 wins the tie.
        let records = vec![
            InteractionRecord::view(1, 1, 100),
            InteractionRecord::view(4, 1, 300),
            InteractionRecord::view(2, 1, 50),
            InteractionRecord::view(3, 1, 300),
        ];
        let sessions = Sessionizer::new(1800).sessionize(&records);
        let users: Vec<_> = sessions.iter().map(|s| (s.id, s.user_id)).collect();
        assert_eq!(users, vec![(0, 2), (1, 1), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let records = vec![
            InteractionRecord::view(1, 3, 2200),
            InteractionRecord::view(1, 1, 0),
            InteractionRecord::view(1, 2, 100),
        ];
        let sessions = Sessionizer::new(1800).sessionize(&records);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].items().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_split_side_channel() {
        let records = vec![
            InteractionRecord::view(1, 1, 0),
            InteractionRecord::new(1, 2, EventType::AddToCart, 10),
            InteractionRecord::view(1, 3, 20),
            // A session made only of a cart event vanishes
            InteractionRecord::new(2, 4, EventType::AddToCart, 5000),
        ];
        let sessions = Sessionizer::new(1800).sessionize(&records);
        let (primary, side) = split_side_channel(sessions, &EventRouting::default());

        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].items().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(side.len(), 2);
        assert_eq!(side[0].session_id, primary[0].id);
        assert_eq!(side[1].item_id, 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_same_session_iff_within_gap(
            raw in proptest::collection::vec((0u64..4, 0i64..20_000), 1..60),
            gap in 1i64..3000,
        ) {
            let records: Vec<_> = raw
                .iter()
                .enumerate()
                .map(|(i, &(u, t))| InteractionRecord::view(u, i as u64, t))
                .collect();
            let sessions = Sessionizer::new(gap).sessionize(&records);

            // Every record ends up in exactly one session
            let total: usize = sessions.iter().map(Session::len).sum();
            prop_assert_eq!(total, records.len());

            // Map each record (item ids are unique here) to its session
            let mut session_of = std::collections::HashMap::new();
            for s in &sessions {
                for e in s.events() {
                    session_of.insert(e.item_id, s.id);
                }
            }

            let mut sorted = records.clone();
            sorted.sort_by_key(|r| (r.user_id, r.timestamp));
            for pair in sorted.windows(2) {
                if pair[0].user_id != pair[1].user_id {
                    continue;
                }
                let same = session_of[&pair[0].item_id] == session_of[&pair[1].item_id];
                let within = (pair[1].timestamp - pair[0].timestamp).abs() <= gap;
                prop_assert_eq!(same, within);
            }
        }
    }
}
