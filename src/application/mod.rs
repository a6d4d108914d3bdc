// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each.
//
// Rules for this layer:
//   - No sessionizing or splitting logic here (that's Layer 4)
//   - No argument parsing or printing (that's Layer 1)
//   - Only workflow coordination and configuration

// Raw event log → filtered, split session files
pub mod preprocess_use_case;

// Split file → padded model-ready sequences
pub mod sequences_use_case;
