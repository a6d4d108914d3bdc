// ============================================================
// Layer 2 — SequencesUseCase
// ============================================================
// Builds model-ready samples from one split file:
//
//   Step 1: Read sessions back from the TSV split   (Layer 6)
//   Step 2: Fit the dense item index                (Layer 4)
//   Step 3: Per session: context window, optional
//           masking, (input, next item) pair        (Layer 4)
//   Step 4: Write samples.jsonl + item_index.json
//
// One seeded StdRng drives every random choice, so the same
// seed and input always give byte-identical output.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::data::sequences::{context_window, mask_items, next_item_pair, ItemIndex, SampleMode, MASK_ID};
use crate::domain::interaction::SessionId;
use crate::infra::split_files::read_sequences;

pub const SAMPLES_FILE: &str = "samples.jsonl";
pub const INDEX_FILE: &str = "item_index.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencesConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Length every input sequence is padded or cut to
    pub max_len: usize,
    /// Longest history a context window may cover
    pub context_size: usize,
    /// Trailing items held out of train-mode windows
    pub val_context_size: usize,
    pub mode: SampleMode,
    /// Probability an input item survives masking (train mode only)
    pub keep_prob: f64,
    pub seed: u64,
}

/// One line of samples.jsonl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSample {
    pub session_id: SessionId,
    pub input: Vec<u32>,
    pub target: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub sessions: usize,
    pub samples: usize,
    pub skipped: usize,
    pub items: usize,
}

pub struct SequencesUseCase {
    config: SequencesConfig,
}

impl SequencesUseCase {
    pub fn new(config: SequencesConfig) -> Result<Self> {
        if config.max_len == 0 || config.context_size == 0 {
            bail!("max_len and context_size must be at least 1");
        }
        if !(0.0..=1.0).contains(&config.keep_prob) {
            bail!("keep_prob must lie in [0, 1], got {}", config.keep_prob);
        }
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<SequenceReport> {
        let cfg = &self.config;

        // ── Step 1: Read sessions ────────────────────────────────────────────
        let sessions = read_sequences(&cfg.input)?;
        tracing::info!("Read {} sessions from '{}'", sessions.len(), cfg.input.display());

        // ── Step 2: Dense item ids ───────────────────────────────────────────
        let index = ItemIndex::fit(sessions.iter().flat_map(|s| s.items.iter().copied()));

        // ── Step 3: Samples ──────────────────────────────────────────────────
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut samples = Vec::with_capacity(sessions.len());
        let mut report = SequenceReport {
            sessions: sessions.len(),
            items: index.len(),
            ..SequenceReport::default()
        };

        for session in &sessions {
            let encoded = index.encode(&session.items);
            let window = context_window(encoded.len(), cfg.mode, cfg.context_size, cfg.val_context_size, &mut rng);
            let context = &encoded[window];

            let context = match (cfg.mode, context.split_last()) {
                (SampleMode::Train, Some((&last, history))) => {
                    let mut masked = mask_items(history, cfg.keep_prob, MASK_ID, &mut rng);
                    masked.push(last);
                    masked
                }
                _ => context.to_vec(),
            };

            match next_item_pair(&context, cfg.max_len) {
                Some((input, target)) => samples.push(SequenceSample {
                    session_id: session.session_id,
                    input,
                    target,
                }),
                None => report.skipped += 1,
            }
        }
        report.samples = samples.len();

        // ── Step 4: Write ────────────────────────────────────────────────────
        fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("Cannot create output directory '{}'", cfg.output_dir.display()))?;

        let samples_path = cfg.output_dir.join(SAMPLES_FILE);
        let file = File::create(&samples_path)
            .with_context(|| format!("Cannot create '{}'", samples_path.display()))?;
        let mut writer = BufWriter::new(file);
        for sample in &samples {
            serde_json::to_writer(&mut writer, sample)?;
            writeln!(writer)?;
        }
        writer.flush()?;

        let index_path = cfg.output_dir.join(INDEX_FILE);
        fs::write(&index_path, serde_json::to_string_pretty(&index)?)
            .with_context(|| format!("Cannot write '{}'", index_path.display()))?;

        tracing::info!(
            "Built {} samples ({} sessions too short) over {} items",
            report.samples,
            report.skipped,
            report.items
        );
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sequences::PAD_ID;
    use crate::domain::interaction::InteractionRecord;
    use crate::domain::session::Session;
    use crate::domain::traits::SplitSink;
    use crate::infra::split_files::TsvSplitWriter;

    fn write_split(dir: &std::path::Path) -> PathBuf {
        let sessions = vec![
            Session::new(0, 1, vec![InteractionRecord::view(1, 30, 1), InteractionRecord::view(1, 10, 2), InteractionRecord::view(1, 20, 3)]).unwrap(),
            Session::new(1, 2, vec![InteractionRecord::view(2, 10, 5)]).unwrap(),
        ];
        TsvSplitWriter::new(dir).unwrap().write_sessions("events_test.txt", &sessions).unwrap()
    }

    fn config(input: PathBuf, output_dir: PathBuf, mode: SampleMode) -> SequencesConfig {
        SequencesConfig {
            input,
            output_dir,
            max_len: 4,
            context_size: 120,
            val_context_size: 0,
            mode,
            keep_prob: 0.8,
            seed: 42,
        }
    }

    #[test]
    fn test_eval_samples() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_split(dir.path());
        let out = dir.path().join("seq");

        let report = SequencesUseCase::new(config(input, out.clone(), SampleMode::Eval))
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(report, SequenceReport { sessions: 2, samples: 1, skipped: 1, items: 3 });

        let text = fs::read_to_string(out.join(SAMPLES_FILE)).unwrap();
        let sample: SequenceSample = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        // Dense ids: 10 → 2, 20 → 3, 30 → 4
        assert_eq!(sample.input, vec![PAD_ID, PAD_ID, 4, 2]);
        assert_eq!(sample.target, 3);

        let index: ItemIndex = serde_json::from_str(&fs::read_to_string(out.join(INDEX_FILE)).unwrap()).unwrap();
        assert_eq!(index.item(4), Some(30));
    }

    #[test]
    fn test_train_samples_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_split(dir.path());

        let run = |name: &str| {
            let out = dir.path().join(name);
            SequencesUseCase::new(config(input.clone(), out.clone(), SampleMode::Train))
                .unwrap()
                .execute()
                .unwrap();
            fs::read_to_string(out.join(SAMPLES_FILE)).unwrap()
        };
        assert_eq!(run("a"), run("b"));
    }

    #[test]
    fn test_rejects_bad_keep_prob() {
        let mut cfg = config(PathBuf::from("x"), PathBuf::from("y"), SampleMode::Train);
        cfg.keep_prob = 1.5;
        assert!(SequencesUseCase::new(cfg).is_err());
    }
}
