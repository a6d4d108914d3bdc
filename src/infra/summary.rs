// ============================================================
// Layer 6 — Run Summary and Config Files
// ============================================================
// JSON files that sit next to the split outputs:
//
//   summary.json — the effective configuration, normaliser
//                  counts and every written file with its stats
//
// and the optional JSON configuration accepted by `preprocess
// --config`. Both go through serde_json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::application::preprocess_use_case::PipelineConfig;
use crate::data::normalizer::NormalizeReport;
use crate::domain::split::SliceBounds;
use crate::infra::stats::DatasetStats;

pub const SUMMARY_FILE: &str = "summary.json";

/// One written split file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub file: PathBuf,
    pub stats: DatasetStats,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slice: Option<SliceBounds>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub config: PipelineConfig,
    pub normalize: NormalizeReport,
    pub loaded: DatasetStats,
    pub filtered: DatasetStats,
    pub outputs: Vec<OutputEntry>,
}

impl RunSummary {
    /// Write `summary.json` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(self)?;

        fs::write(&path, json).with_context(|| format!("Cannot write summary to '{}'", path.display()))?;

        tracing::debug!("Saved run summary to '{}'", path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read summary from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Load a pipeline configuration from JSON. Missing keys take
/// their defaults; unknown enum values fail here, before any data
/// is read.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

    serde_json::from_str(&json).with_context(|| format!("Invalid config in '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::ProcessMethod;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "process_method": "slice", "num_slices": 3 }"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.process_method, ProcessMethod::Slice);
        assert_eq!(cfg.slices.num_slices, 3);
        assert_eq!(cfg.min_item_support, 5);
        assert_eq!(cfg.session_length, 1800);
    }

    #[test]
    fn test_unknown_process_method_in_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "process_method": "weekly" }"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unknown process method 'weekly'"));
    }

    #[test]
    fn test_summary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let summary = RunSummary {
            config: PipelineConfig::default(),
            normalize: NormalizeReport::default(),
            loaded: DatasetStats::default(),
            filtered: DatasetStats::default(),
            outputs: vec![OutputEntry {
                file: PathBuf::from("events_test.txt"),
                stats: DatasetStats::default(),
                slice: None,
            }],
        };
        let path = summary.save(dir.path()).unwrap();
        assert_eq!(RunSummary::load(&path).unwrap(), summary);
    }
}
