// ============================================================
// Layer 4 — Slice Emitter
// ============================================================
// Produces several independent train/test pairs from a sliding
// time window over the filtered sessions.
//
// For slice k:
//   offset = days_offset + k * days_shift
//   start  = first event of the data + offset days
//   split  = start + days_train days
//   end    = split + days_test days
//
//   slice 0  |start ──── train ──── split ─ test ─ end|
//   slice 1          |start ──── train ──── split ─ test ─ end|
//                    ◀─ days_shift ─▶
//
// Only sessions whose end falls in [start, end] take part; the
// split itself is the same rule as the temporal splitter, cut at
// `split`. Each slice is built from the shared read-only input and
// owns its own sessions, so slices can be written and dropped one
// at a time.

use serde::{Deserialize, Serialize};

use crate::data::splitter::TemporalSplitter;
use crate::domain::interaction::{Timestamp, SECONDS_PER_DAY};
use crate::domain::session::{min_start, Session};
use crate::domain::split::{Slice, SliceBounds};

/// Window parameters, all in days except `num_slices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    pub num_slices: usize,
    pub days_offset: i64,
    pub days_shift: i64,
    pub days_train: i64,
    pub days_test: i64,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            num_slices: 5,
            days_offset: 0,
            days_shift: 27,
            days_train: 25,
            days_test: 2,
        }
    }
}

impl SliceConfig {
    /// Window boundaries of slice `k` for data starting at `data_start`.
    /// Saturates instead of overflowing for extreme day counts.
    pub fn bounds(&self, k: usize, data_start: Timestamp) -> SliceBounds {
        let k = i64::try_from(k).unwrap_or(i64::MAX);
        let offset = self.days_offset.saturating_add(k.saturating_mul(self.days_shift));
        let start = data_start.saturating_add(days(offset));
        let split = start.saturating_add(days(self.days_train));
        let end = split.saturating_add(days(self.days_test));
        SliceBounds { start, split, end }
    }
}

fn days(n: i64) -> Timestamp {
    n.saturating_mul(SECONDS_PER_DAY)
}

pub struct SliceEmitter<'a> {
    config: SliceConfig,
    splitter: &'a TemporalSplitter,
}

impl<'a> SliceEmitter<'a> {
    pub fn new(config: SliceConfig, splitter: &'a TemporalSplitter) -> Self {
        Self { config, splitter }
    }

    /// Lazily yield every slice in index order.
    ///
    /// An empty input still yields `num_slices` empty slices, with
    /// windows anchored at time 0.
    pub fn slices<'s>(&'s self, sessions: &'s [Session]) -> impl Iterator<Item = Slice> + 's {
        let data_start = min_start(sessions).unwrap_or(0);
        (0..self.config.num_slices).map(move |k| self.slice(k, sessions, data_start))
    }

    fn slice(&self, id: usize, sessions: &[Session], data_start: Timestamp) -> Slice {
        let bounds = self.config.bounds(id, data_start);

        let window: Vec<Session> = sessions
            .iter()
            .filter(|s| (bounds.start..=bounds.end).contains(&s.end()))
            .cloned()
            .collect();

        let (train, test) = self.splitter.split_at(&window, bounds.split);

        tracing::debug!(
            "Slice {}: {} sessions in window, {} train, {} test",
            id,
            window.len(),
            train.len(),
            test.len()
        );

        Slice { id, bounds, train, test }
    }
}
