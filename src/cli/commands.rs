// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `preprocess` and `sequences`
// and all their configurable flags.
//
// `preprocess` flags are all optional: a flag that is given
// overrides the same key of the JSON config file (or of the
// built-in defaults when no file is given).

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::preprocess_use_case::PipelineConfig;
use crate::application::sequences_use_case::SequencesConfig;
use crate::data::filter::FilterMode;
use crate::data::sequences::SampleMode;
use crate::data::splitter::{ColdItemPolicy, ProcessMethod};
use crate::domain::interaction::TimestampUnit;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn a raw event log into session split files
    Preprocess(PreprocessArgs),

    /// Build padded next-item samples from one split file
    Sequences(SequencesArgs),
}

/// All arguments for the `preprocess` command.
#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// Raw event log: timestamp, user, event, item
    #[arg(long)]
    pub input: PathBuf,

    /// Directory the split files and summary.json go to
    #[arg(long, default_value = "prepared")]
    pub output_dir: PathBuf,

    /// JSON file with pipeline settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// last | last_min_date | days_test | slice
    #[arg(long)]
    pub process_method: Option<ProcessMethod>,

    /// Earliest day kept by last_min_date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub min_date: Option<String>,

    /// Inactivity gap in seconds that closes a session
    #[arg(long)]
    pub session_length: Option<i64>,

    #[arg(long)]
    pub min_session_length: Option<usize>,

    #[arg(long)]
    pub min_item_support: Option<usize>,

    #[arg(long)]
    pub num_slices: Option<usize>,

    #[arg(long)]
    pub days_offset: Option<i64>,

    #[arg(long)]
    pub days_shift: Option<i64>,

    #[arg(long)]
    pub days_train: Option<i64>,

    /// Test window in days (days_test and slice methods)
    #[arg(long)]
    pub days_test: Option<i64>,

    /// Unit of the timestamp column: ms or s
    #[arg(long)]
    pub timestamp_unit: Option<TimestampUnit>,

    /// Single ASCII column delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// The input has no header row
    #[arg(long)]
    pub no_header: bool,

    /// fixed-point | two-pass
    #[arg(long)]
    pub filter_mode: Option<FilterMode>,

    /// drop-session | drop-events
    #[arg(long)]
    pub cold_items: Option<ColdItemPolicy>,
}

impl PreprocessArgs {
    /// Apply the flags that were given on top of `base`.
    /// The application layer never sees clap types.
    pub fn overlay(&self, mut base: PipelineConfig) -> PipelineConfig {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut base.process_method, &self.process_method);
        set(&mut base.min_date, &self.min_date);
        set(&mut base.session_length, &self.session_length);
        set(&mut base.min_session_length, &self.min_session_length);
        set(&mut base.min_item_support, &self.min_item_support);
        set(&mut base.slices.num_slices, &self.num_slices);
        set(&mut base.slices.days_offset, &self.days_offset);
        set(&mut base.slices.days_shift, &self.days_shift);
        set(&mut base.slices.days_train, &self.days_train);
        set(&mut base.slices.days_test, &self.days_test);
        set(&mut base.timestamp_unit, &self.timestamp_unit);
        set(&mut base.delimiter, &self.delimiter);
        set(&mut base.filter_mode, &self.filter_mode);
        set(&mut base.cold_items, &self.cold_items);
        if self.no_header {
            base.has_headers = false;
        }
        base
    }
}

/// All arguments for the `sequences` command
#[derive(Args, Debug)]
pub struct SequencesArgs {
    /// A split file written by `preprocess`
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for samples.jsonl and item_index.json
    #[arg(long, default_value = "sequences")]
    pub output_dir: PathBuf,

    /// Input length every sample is padded or cut to
    #[arg(long, default_value_t = 20)]
    pub max_len: usize,

    /// Longest history a context window may cover
    #[arg(long, default_value_t = 120)]
    pub context_size: usize,

    /// Trailing items kept out of train-mode windows
    #[arg(long, default_value_t = 0)]
    pub val_context_size: usize,

    /// train (random windows, masking) or eval
    #[arg(long, default_value = "eval")]
    pub mode: SampleMode,

    /// Probability an input item survives masking in train mode
    #[arg(long, default_value_t = 0.8)]
    pub keep_prob: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<SequencesArgs> for SequencesConfig {
    fn from(a: SequencesArgs) -> Self {
        SequencesConfig {
            input:            a.input,
            output_dir:       a.output_dir,
            max_len:          a.max_len,
            context_size:     a.context_size,
            val_context_size: a.val_context_size,
            mode:             a.mode,
            keep_prob:        a.keep_prob,
            seed:             a.seed,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_flags_override_base_config() {
        let cli = Cli::parse_from([
            "session-prep",
            "preprocess",
            "--input",
            "events.csv",
            "--process-method",
            "slice",
            "--num-slices",
            "3",
            "--timestamp-unit",
            "s",
            "--no-header",
        ]);
        let Commands::Preprocess(args) = cli.command else {
            panic!("expected preprocess");
        };

        let base = PipelineConfig {
            min_item_support: 9,
            ..PipelineConfig::default()
        };
        let cfg = args.overlay(base);
        assert_eq!(cfg.process_method, ProcessMethod::Slice);
        assert_eq!(cfg.slices.num_slices, 3);
        assert_eq!(cfg.timestamp_unit, TimestampUnit::Seconds);
        assert!(!cfg.has_headers);
        // Untouched keys keep the base value
        assert_eq!(cfg.min_item_support, 9);
        assert_eq!(cfg.slices.days_shift, 27);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let parsed = Cli::try_parse_from([
            "session-prep",
            "preprocess",
            "--input",
            "events.csv",
            "--process-method",
            "weekly",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sequences_defaults() {
        let cli = Cli::parse_from(["session-prep", "sequences", "--input", "events_test.txt"]);
        let Commands::Sequences(args) = cli.command else {
            panic!("expected sequences");
        };
        let cfg: SequencesConfig = args.into();
        assert_eq!(cfg.max_len, 20);
        assert_eq!(cfg.context_size, 120);
        assert_eq!(cfg.mode, SampleMode::Eval);
        assert_eq!(cfg.seed, 42);
    }
}
