// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits that name the concepts of the
// pipeline: interactions, sessions, splits and slices.
//
// Rules for this layer:
//   - NO file I/O
//   - NO logging
//   - Only data types, small invariants and traits

// Interaction records, event types and id aliases
pub mod interaction;

// Sessions and set-level helpers over them
pub mod session;

// Train/validation/test splits and time slices
pub mod split;

// Configuration errors
pub mod error;

// Seams to the outside world (sources and sinks)
pub mod traits;
