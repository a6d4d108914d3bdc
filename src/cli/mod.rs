// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All pipeline logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `preprocess` — raw event log → session split files
//   2. `sequences`  — split file → padded next-item samples

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PreprocessArgs, SequencesArgs};

use crate::application::preprocess_use_case::{PipelineConfig, PreprocessUseCase};
use crate::application::sequences_use_case::SequencesUseCase;
use crate::data::loader::CsvEventLoader;
use crate::infra::split_files::TsvSplitWriter;
use crate::infra::summary::load_config;

#[derive(Parser, Debug)]
#[command(
    name = "session-prep",
    version,
    about = "Turn raw interaction logs into session-based recommendation datasets."
)]
pub struct Cli {
    /// The subcommand to run (preprocess or sequences)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case. Never computes anything itself.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Preprocess(args) => run_preprocess(args),
            Commands::Sequences(args) => run_sequences(args),
        }
    }
}

/// Handles the `preprocess` subcommand.
fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    let config = args.overlay(base);

    // Validation happens here, before the input is opened
    let use_case = PreprocessUseCase::new(config).context("Invalid configuration")?;
    let cfg = use_case.config();

    tracing::info!("Reading events from: {}", args.input.display());
    let source = CsvEventLoader::new(&args.input, cfg.delimiter_byte()?, cfg.has_headers);
    let sink = TsvSplitWriter::new(&args.output_dir)?;

    let summary = use_case.execute(&source, &sink)?;
    let summary_path = summary.save(sink.dir())?;

    println!(
        "Preprocessing complete. {} files written to '{}' (summary: {}).",
        summary.outputs.len(),
        args.output_dir.display(),
        summary_path.display()
    );
    Ok(())
}

/// Handles the `sequences` subcommand.
fn run_sequences(args: SequencesArgs) -> Result<()> {
    let output_dir = args.output_dir.clone();
    let report = SequencesUseCase::new(args.into())?.execute()?;

    println!(
        "Built {} samples from {} sessions into '{}'.",
        report.samples,
        report.sessions,
        output_dir.display()
    );
    Ok(())
}
