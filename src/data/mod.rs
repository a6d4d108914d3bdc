// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw log rows all the way
// to the split session sets that get written to disk.
//
// The pipeline flows in this order:
//
//   events.csv
//       │
//       ▼
//   CsvEventLoader    → reads rows into RawRecords
//       │
//       ▼
//   Normalizer        → typed records, seconds, routing
//       │
//       ▼
//   Sessionizer       → per-user runs split on inactivity
//       │
//       ▼
//   SupportFilter     → short sessions and rare items removed
//       │
//       ▼
//   TemporalSplitter  → train / test (/ validation) by time
//   SliceEmitter      → or several windowed train/test pairs
//
// Sequence building (sequences.rs) works on a split file read
// back from disk and is independent of the steps above.
//
// Each module is responsible for exactly one step.

/// Reads delimited event logs with the csv crate
pub mod loader;

/// Validates raw rows and routes them by event type
pub mod normalizer;

/// Groups records into sessions by inactivity gap
pub mod sessionizer;

/// Session length and item support filter
pub mod filter;

/// Time based train/test/validation splits
pub mod splitter;

/// Sliding time-window slices
pub mod slicer;

/// Dense ids, context windows and padded samples
pub mod sequences;
