// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that touch the file system or only
// report on the pipeline:
//
//   split_files.rs — The TSV split format
//                    Writes sessions and side events as
//                    SessionId/Time/ItemId rows, and reads a
//                    split file back as item sequences.
//
//   stats.rs       — Dataset statistics
//                    Event, session and item counts plus the
//                    date span, logged after every stage.
//
//   summary.rs     — JSON files
//                    The optional pipeline config and the
//                    summary.json written next to the splits.

/// TSV split writer and reader
pub mod split_files;

/// Per-stage dataset statistics
pub mod stats;

/// Config file loading and run summary
pub mod summary;
