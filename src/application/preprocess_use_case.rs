// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// Orchestrates the full preprocessing pipeline in order:
//
//   Step 1: Validate the configuration        (before any I/O)
//   Step 2: Load raw rows                     (EventSource)
//   Step 3: Normalise rows into records       (Layer 4 - data)
//   Step 4: Sessionize, split off side events (Layer 4 - data)
//   Step 5: Support filter to a fixed point   (Layer 4 - data)
//   Step 6: Temporal split or slices          (Layer 4 - data)
//   Step 7: Write split files + buys file     (SplitSink)
//
// Every step takes the previous snapshot and returns a new one.
// The previous snapshot is dropped as soon as the next exists.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    filter::{FilterMode, SupportFilter},
    normalizer::{EventRouting, Normalizer},
    sessionizer::{split_side_channel, Sessionizer, DEFAULT_SESSION_GAP},
    slicer::{SliceConfig, SliceEmitter},
    splitter::{filter_min_date, parse_min_date, ColdItemPolicy, ProcessMethod, TemporalSplitter},
};
use crate::domain::error::ConfigError;
use crate::domain::interaction::{Timestamp, TimestampUnit};
use crate::domain::session::Session;
use crate::domain::split::{SliceBounds, Split};
use crate::domain::traits::{EventSource, SplitSink};
use crate::infra::split_files::{file_name, BUYS, TEST, TRAIN_FULL, TRAIN_TR, TRAIN_VALID};
use crate::infra::stats::DatasetStats;
use crate::infra::summary::{OutputEntry, RunSummary};

/// Upper bound for every day-count setting (a century).
pub const MAX_DAYS: i64 = 36_500;

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Every knob of a preprocessing run. Serialisable so it can be
// read from a JSON file and echoed into summary.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub process_method: ProcessMethod,
    /// `YYYY-MM-DD`, used by `last_min_date`
    pub min_date: String,
    /// Inactivity gap in seconds
    pub session_length: Timestamp,
    pub min_session_length: usize,
    pub min_item_support: usize,
    #[serde(flatten)]
    pub slices: SliceConfig,
    pub timestamp_unit: TimestampUnit,
    pub delimiter: char,
    pub has_headers: bool,
    pub filter_mode: FilterMode,
    pub cold_items: ColdItemPolicy,
    pub routing: EventRouting,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            process_method: ProcessMethod::Last,
            min_date: "2015-09-02".to_string(),
            session_length: DEFAULT_SESSION_GAP,
            min_session_length: 2,
            min_item_support: 5,
            slices: SliceConfig::default(),
            timestamp_unit: TimestampUnit::Milliseconds,
            delimiter: ',',
            has_headers: true,
            filter_mode: FilterMode::FixedPoint,
            cold_items: ColdItemPolicy::DropSession,
            routing: EventRouting::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject configurations that can never run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("min_session_length", self.min_session_length)?;
        at_least_one("min_item_support", self.min_item_support)?;
        if self.process_method == ProcessMethod::Slice {
            at_least_one("num_slices", self.slices.num_slices)?;
        }
        if self.session_length <= 0 {
            return Err(ConfigError::NotPositive {
                name: "session_length",
                value: self.session_length,
            });
        }
        day_count("days_offset", self.slices.days_offset)?;
        day_count("days_shift", self.slices.days_shift)?;
        day_count("days_train", self.slices.days_train)?;
        day_count("days_test", self.slices.days_test)?;
        self.delimiter_byte()?;
        parse_min_date(&self.min_date)?;
        Ok(())
    }

    /// The delimiter as the single byte the csv reader wants.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter.to_string()))
        }
    }
}

fn day_count(name: &'static str, value: i64) -> Result<(), ConfigError> {
    if !(0..=MAX_DAYS).contains(&value) {
        return Err(ConfigError::DaysOutOfRange {
            name,
            value,
            max: MAX_DAYS,
        });
    }
    Ok(())
}

fn at_least_one(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::BelowOne { name, value });
    }
    Ok(())
}

// ─── PreprocessUseCase ────────────────────────────────────────────────────────
pub struct PreprocessUseCase {
    config: PipelineConfig,
}

impl PreprocessUseCase {
    /// Validate `config` and build the use case. Fails before any
    /// data is touched.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline end to end.
    pub fn execute(&self, source: &dyn EventSource, sink: &dyn SplitSink) -> Result<RunSummary> {
        let cfg = &self.config;
        tracing::info!(
            "Preprocessing with method '{}', filter mode '{}', cold items '{}'",
            cfg.process_method,
            cfg.filter_mode,
            cfg.cold_items
        );

        // ── Step 2: Load raw rows ────────────────────────────────────────────
        let raw = source.load_all()?;

        // ── Step 3: Normalise ────────────────────────────────────────────────
        let normalized = Normalizer::new(cfg.timestamp_unit, cfg.routing).normalize(&raw);
        drop(raw);
        let report = normalized.report;
        if report.malformed > 0 {
            tracing::warn!("Dropped {} malformed rows of {}", report.malformed, report.total);
        }

        // ── Step 4: Sessionize and split off the side channel ────────────────
        let sessions = Sessionizer::new(cfg.session_length).sessionize(&normalized.records);
        drop(normalized);
        let (sessions, side_events) = split_side_channel(sessions, &cfg.routing);

        let loaded = DatasetStats::of(&sessions);
        loaded.log("Loaded data set");

        // ── Step 5: Support filter ───────────────────────────────────────────
        let sessions =
            SupportFilter::new(cfg.min_session_length, cfg.min_item_support, cfg.filter_mode).apply(sessions);

        let filtered = DatasetStats::of(&sessions);
        filtered.log("Filtered data set");
        if filtered.is_empty() {
            tracing::warn!("No sessions left after filtering; all splits will be empty");
        }

        // ── Step 6 + 7: Split and write ──────────────────────────────────────
        let splitter = TemporalSplitter::new(cfg.cold_items);
        let mut outputs = Vec::new();

        match cfg.process_method {
            ProcessMethod::Last => {
                let split = splitter.split_with_validation(&sessions);
                write_split(sink, &split, &mut outputs)?;
            }
            ProcessMethod::LastMinDate => {
                let min_date = parse_min_date(&cfg.min_date)?;
                let sessions = filter_min_date(sessions, min_date);
                DatasetStats::of(&sessions).log(&format!("Data set after {}", cfg.min_date));

                let split = splitter.split_with_validation(&sessions);
                write_split(sink, &split, &mut outputs)?;
            }
            ProcessMethod::DaysTest => {
                let split = splitter.split_last_days(&sessions, cfg.slices.days_test);
                write_split(sink, &split, &mut outputs)?;
            }
            ProcessMethod::Slice => {
                let emitter = SliceEmitter::new(cfg.slices, &splitter);
                for slice in emitter.slices(&sessions) {
                    let k = Some(slice.id);
                    let bounds = Some(slice.bounds);
                    write_sessions(sink, &file_name(TRAIN_FULL, k), &slice.train, bounds, &mut outputs)?;
                    write_sessions(sink, &file_name(TEST, k), &slice.test, bounds, &mut outputs)?;
                }
            }
        }

        let buys = DatasetStats::of_side_events(&side_events);
        buys.log("Side channel events");
        let path = sink.write_side_events(&file_name(BUYS, None), &side_events)?;
        outputs.push(OutputEntry {
            file: path,
            stats: buys,
            slice: None,
        });

        Ok(RunSummary {
            config: cfg.clone(),
            normalize: report,
            loaded,
            filtered,
            outputs,
        })
    }
}

fn write_split(sink: &dyn SplitSink, split: &Split, outputs: &mut Vec<OutputEntry>) -> Result<()> {
    write_sessions(sink, &file_name(TRAIN_FULL, None), &split.train, None, outputs)?;
    write_sessions(sink, &file_name(TEST, None), &split.test, None, outputs)?;

    if let Some(valid) = &split.validation {
        write_sessions(sink, &file_name(TRAIN_TR, None), &valid.train, None, outputs)?;
        write_sessions(sink, &file_name(TRAIN_VALID, None), &valid.validation, None, outputs)?;
    }
    Ok(())
}

fn write_sessions(
    sink: &dyn SplitSink,
    name: &str,
    sessions: &[Session],
    slice: Option<SliceBounds>,
    outputs: &mut Vec<OutputEntry>,
) -> Result<()> {
    let stats = DatasetStats::of(sessions);
    stats.log(name);

    let file = sink.write_sessions(name, sessions)?;
    outputs.push(OutputEntry { file, stats, slice });
    Ok(())
}
