// ============================================================
// Layer 3 — Configuration Errors
// ============================================================
// Everything that can be wrong with a pipeline configuration.
// These are raised while the config is validated, before a
// single input record is read. Runtime failures (I/O, bad
// files) travel as anyhow::Error instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown process method '{0}' (expected last, last_min_date, days_test or slice)")]
    UnknownProcessMethod(String),

    #[error("unknown timestamp unit '{0}' (expected s or ms)")]
    UnknownTimestampUnit(String),

    #[error("unknown filter mode '{0}' (expected fixed-point or two-pass)")]
    UnknownFilterMode(String),

    #[error("unknown cold item policy '{0}' (expected drop-session or drop-events)")]
    UnknownColdItemPolicy(String),

    #[error("unknown sample mode '{0}' (expected train or eval)")]
    UnknownSampleMode(String),

    #[error("invalid min_date '{0}': expected YYYY-MM-DD")]
    InvalidMinDate(String),

    #[error("{name} must be at least 1, got {value}")]
    BelowOne { name: &'static str, value: usize },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: i64 },

    #[error("{name} must lie between 0 and {max} days, got {value}")]
    DaysOutOfRange { name: &'static str, value: i64, max: i64 },

    #[error("delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
}
