// ============================================================
// Layer 3 — Split and Slice Types
// ============================================================
// The outputs of the temporal splitter and the slice emitter.
//
//   Split  — train / optional validation / test
//   Slice  — one (train, test) pair cut from a sliding window,
//            tagged with its index and window boundaries
//
// A Split or Slice owns its sessions outright. Two slices never
// share a session value even when the source sessions overlap.

use serde::{Deserialize, Serialize};

use crate::domain::interaction::Timestamp;
use crate::domain::session::Session;

/// Train sessions nested inside the full train set for
/// model selection: `train` + `validation` partition the outer train.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSplit {
    pub train: Vec<Session>,
    pub validation: Vec<Session>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<Session>,
    pub test: Vec<Session>,
    /// Present for the `last` / `last_min_date` methods only.
    pub validation: Option<ValidationSplit>,
}

/// Time boundaries of one slice window, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceBounds {
    pub start: Timestamp,
    pub split: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub id: usize,
    pub bounds: SliceBounds,
    pub train: Vec<Session>,
    pub test: Vec<Session>,
}
