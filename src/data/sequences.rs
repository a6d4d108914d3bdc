// ============================================================
// Layer 4 — Sequence Builder
// ============================================================
// Turns sessions from a split file into fixed-length integer
// sequences a sequence model can consume.
//
// Steps:
//   ItemIndex       → raw item ids mapped to dense ids from 2
//                     (0 = padding, 1 = mask)
//   context_window  → which slice of a long history to use;
//                     random end point in train mode, the full
//                     tail in evaluation mode
//   mask_items      → randomly hide inputs behind the mask token
//   pad             → left or right padding to a fixed size
//   next_item_pair  → (everything but the last item, last item)
//   sliding_windows → fixed windows at a stride, tail-aligned
//
// Randomness always comes from an RNG the caller seeds, so two
// runs with the same seed build the same samples.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use crate::domain::error::ConfigError;
use crate::domain::interaction::{ItemId, SessionId};

/// Dense id reserved for padding.
pub const PAD_ID: u32 = 0;
/// Dense id reserved for masked positions.
pub const MASK_ID: u32 = 1;
/// First dense id handed to a real item.
pub const FIRST_ITEM_ID: u32 = 2;

/// Train mode never ends a context window earlier than this.
const MIN_TRAIN_CONTEXT_END: usize = 10;

/// The item sequence of one session, as read back from a split file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSequence {
    pub session_id: SessionId,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    Train,
    Eval,
}

impl std::str::FromStr for SampleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "eval" | "test" | "valid" => Ok(Self::Eval),
            other => Err(ConfigError::UnknownSampleMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadSide {
    Left,
    Right,
}

// ─── ItemIndex ────────────────────────────────────────────────────────────────
/// Bidirectional mapping between raw item ids and dense ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIndex {
    forward: HashMap<ItemId, u32>,
    inverse: Vec<ItemId>,
}

impl ItemIndex {
    /// Assign dense ids to the distinct items in ascending raw order.
    pub fn fit(items: impl IntoIterator<Item = ItemId>) -> Self {
        let distinct: BTreeSet<ItemId> = items.into_iter().collect();
        let inverse: Vec<ItemId> = distinct.into_iter().collect();
        let forward = inverse
            .iter()
            .zip(FIRST_ITEM_ID..)
            .map(|(&item, id)| (item, id))
            .collect();
        Self { forward, inverse }
    }

    pub fn get(&self, item: ItemId) -> Option<u32> {
        self.forward.get(&item).copied()
    }

    pub fn item(&self, dense: u32) -> Option<ItemId> {
        let offset = dense.checked_sub(FIRST_ITEM_ID)?;
        self.inverse.get(offset as usize).copied()
    }

    /// Number of real items (reserved ids not counted).
    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }

    /// Map a sequence, dropping items the index has never seen.
    pub fn encode(&self, items: &[ItemId]) -> Vec<u32> {
        items.iter().filter_map(|&i| self.get(i)).collect()
    }
}

// ─── Windowing ────────────────────────────────────────────────────────────────
/// Pick the part of a history of length `len` to use as context.
///
/// Train mode draws the window end uniformly from
/// `[min(10, hi), hi]` where `hi = len - val_context_size`, keeping
/// the last `val_context_size` items out of training. Eval mode ends
/// at `len`. The window holds at most `context_size` items.
pub fn context_window<R: Rng + ?Sized>(
    len: usize,
    mode: SampleMode,
    context_size: usize,
    val_context_size: usize,
    rng: &mut R,
) -> Range<usize> {
    let end = match mode {
        SampleMode::Train => {
            let hi = len.saturating_sub(val_context_size);
            let lo = MIN_TRAIN_CONTEXT_END.min(hi);
            rng.gen_range(lo..=hi)
        }
        SampleMode::Eval => len,
    };
    end.saturating_sub(context_size)..end
}

/// Replace each item with `mask` with probability `1 - keep_prob`.
pub fn mask_items<R: Rng + ?Sized>(items: &[u32], keep_prob: f64, mask: u32, rng: &mut R) -> Vec<u32> {
    items
        .iter()
        .map(|&i| if rng.gen_bool(keep_prob) { i } else { mask })
        .collect()
}

/// Pad `items` up to `size`. Longer inputs are returned unchanged.
pub fn pad(items: &[u32], size: usize, pad_value: u32, side: PadSide) -> Vec<u32> {
    if items.len() >= size {
        return items.to_vec();
    }
    let fill = std::iter::repeat(pad_value).take(size - items.len());
    match side {
        PadSide::Left => fill.chain(items.iter().copied()).collect(),
        PadSide::Right => items.iter().copied().chain(fill).collect(),
    }
}

/// Windows of `window` values every `step` values. When the last
/// stride runs past the end, one final window aligned to the tail is
/// added instead, provided the input is at least `window` long.
///
/// Example with window=3, step=2 over [a b c d e f]:
///   [a b c], [c d e], [d e f]
pub fn sliding_windows<T: Clone>(values: &[T], window: usize, step: usize) -> Vec<Vec<T>> {
    let mut windows = Vec::new();
    if window == 0 || step == 0 {
        return windows;
    }

    let mut start = 0usize;
    loop {
        let end = start + window;
        if end > values.len() {
            if values.len() >= window {
                windows.push(values[values.len() - window..].to_vec());
            }
            break;
        }
        windows.push(values[start..end].to_vec());
        start += step;
    }
    windows
}

/// Split a sequence into a left-padded input of its most recent
/// `max_len` items before the last one, and the last item as target.
/// `None` for sequences shorter than two.
pub fn next_item_pair(items: &[u32], max_len: usize) -> Option<(Vec<u32>, u32)> {
    let (&target, history) = items.split_last()?;
    if history.is_empty() {
        return None;
    }
    let recent = &history[history.len().saturating_sub(max_len)..];
    Some((pad(recent, max_len, PAD_ID, PadSide::Left), target))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_index_starts_at_two() {
        let index = ItemIndex::fit(vec![500, 20, 500, 7]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(7), Some(2));
        assert_eq!(index.get(20), Some(3));
        assert_eq!(index.get(500), Some(4));
        assert_eq!(index.item(4), Some(500));
        assert_eq!(index.item(PAD_ID), None);
        assert_eq!(index.encode(&[20, 999, 7]), vec![3, 2]);
    }

    #[test]
    fn test_eval_window_is_the_tail() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(context_window(200, SampleMode::Eval, 120, 5, &mut rng), 80..200);
        assert_eq!(context_window(30, SampleMode::Eval, 120, 5, &mut rng), 0..30);
    }

    #[test]
    fn test_train_window_is_seeded_and_bounded() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| context_window(100, SampleMode::Train, 30, 5, &mut rng))
                .collect::<Vec<_>>()
        };
        let a = draw(42);
        assert_eq!(a, draw(42));

        for w in &a {
            assert!(w.end >= 10 && w.end <= 95);
            assert!(w.len() <= 30);
        }
    }

    #[test]
    fn test_train_window_on_short_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = context_window(4, SampleMode::Train, 30, 5, &mut rng);
        assert_eq!(w, 0..0);
    }

    #[test]
    fn test_pad_sides() {
        assert_eq!(pad(&[5, 6], 4, 0, PadSide::Left), vec![0, 0, 5, 6]);
        assert_eq!(pad(&[5, 6], 4, 0, PadSide::Right), vec![5, 6, 0, 0]);
        assert_eq!(pad(&[1, 2, 3], 2, 0, PadSide::Left), vec![1, 2, 3]);
    }

    #[test]
    fn test_sliding_windows_tail_rule() {
        let v = ['a', 'b', 'c', 'd', 'e', 'f'];
        let w = sliding_windows(&v, 3, 2);
        assert_eq!(w, vec![vec!['a', 'b', 'c'], vec!['c', 'd', 'e'], vec!['d', 'e', 'f']]);

        // The stride past the end still adds the tail window
        let w = sliding_windows(&[1, 2, 3, 4], 2, 2);
        assert_eq!(w, vec![vec![1, 2], vec![3, 4], vec![3, 4]]);

        assert!(sliding_windows(&[1, 2], 3, 1).is_empty());
    }

    #[test]
    fn test_next_item_pair() {
        assert_eq!(next_item_pair(&[4, 5, 6], 4), Some((vec![0, 0, 4, 5], 6)));
        assert_eq!(next_item_pair(&[2, 3, 4, 5, 6], 2), Some((vec![4, 5], 6)));
        assert_eq!(next_item_pair(&[9], 4), None);
        assert_eq!(next_item_pair(&[], 4), None);
    }

    #[test]
    fn test_mask_is_seeded() {
        let items: Vec<u32> = (2..50).collect();
        let a = mask_items(&items, 0.5, MASK_ID, &mut StdRng::seed_from_u64(7));
        let b = mask_items(&items, 0.5, MASK_ID, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.contains(&MASK_ID));
        assert_eq!(mask_items(&items, 1.0, MASK_ID, &mut StdRng::seed_from_u64(7)), items);
    }
}
