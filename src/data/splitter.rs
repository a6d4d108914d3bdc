// ============================================================
// Layer 4 — Temporal Splitter
// ============================================================
// Cuts sessions into train / test (and optionally validation)
// by time. A session is placed by its END time:
//
//   ──────────────────────────┬───────────────▶ time
//        end < split → train  │ end ≥ split → test
//                           split
//
// Policies:
//   last           split = max end − 1 day, plus a nested
//                  train/validation cut of the train side
//   last_min_date  drop sessions ending on or before min_date,
//                  then as `last`
//   days_test      split = max end − days_test days
//   slice          handled by the slice emitter
//
// The evaluation side is cleaned afterwards: items never seen in
// train cannot be scored, and a session needs at least two events
// to give an (input, next item) pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::error::ConfigError;
use crate::domain::interaction::{ItemId, Timestamp, SECONDS_PER_DAY};
use crate::domain::session::{item_set, max_end, Session};
use crate::domain::split::{Split, ValidationSplit};

/// Shortest evaluation session that still yields a prediction target.
pub const MIN_EVAL_SESSION_LENGTH: usize = 2;

/// Which temporal policy the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProcessMethod {
    Last,
    LastMinDate,
    DaysTest,
    Slice,
}

impl ProcessMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last => "last",
            Self::LastMinDate => "last_min_date",
            Self::DaysTest => "days_test",
            Self::Slice => "slice",
        }
    }
}

impl fmt::Display for ProcessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last" => Ok(Self::Last),
            "last_min_date" => Ok(Self::LastMinDate),
            "days_test" => Ok(Self::DaysTest),
            "slice" => Ok(Self::Slice),
            other => Err(ConfigError::UnknownProcessMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for ProcessMethod {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProcessMethod> for String {
    fn from(method: ProcessMethod) -> Self {
        method.as_str().to_string()
    }
}

/// What to do with an evaluation session that contains an item
/// the train side never saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColdItemPolicy {
    /// Discard the whole session.
    DropSession,
    /// Remove only the unseen events, keep the rest of the session.
    DropEvents,
}

impl ColdItemPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropSession => "drop-session",
            Self::DropEvents => "drop-events",
        }
    }
}

impl fmt::Display for ColdItemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ColdItemPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-session" | "drop_session" => Ok(Self::DropSession),
            "drop-events" | "drop_events" => Ok(Self::DropEvents),
            other => Err(ConfigError::UnknownColdItemPolicy(other.to_string())),
        }
    }
}

impl TryFrom<String> for ColdItemPolicy {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ColdItemPolicy> for String {
    fn from(policy: ColdItemPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Midnight UTC of a `YYYY-MM-DD` date, as Unix seconds.
pub fn parse_min_date(date: &str) -> Result<Timestamp, ConfigError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ConfigError::InvalidMinDate(date.to_string()))
}

/// Keep only sessions that end strictly after `min_date`.
pub fn filter_min_date(sessions: Vec<Session>, min_date: Timestamp) -> Vec<Session> {
    sessions.into_iter().filter(|s| s.end() > min_date).collect()
}

pub struct TemporalSplitter {
    cold_items: ColdItemPolicy,
}

impl TemporalSplitter {
    pub fn new(cold_items: ColdItemPolicy) -> Self {
        Self { cold_items }
    }

    /// Split at `split_point`, then clean the test side against train.
    pub fn split_at(&self, sessions: &[Session], split_point: Timestamp) -> (Vec<Session>, Vec<Session>) {
        let (train, candidates): (Vec<Session>, Vec<Session>) =
            sessions.iter().cloned().partition(|s| s.end() < split_point);

        let test = self.clean_evaluation(&train, candidates);
        (train, test)
    }

    /// Test = the last `days` days before the latest session end.
    pub fn split_last_days(&self, sessions: &[Session], days: i64) -> Split {
        let Some(latest) = max_end(sessions) else {
            return Split::default();
        };

        let split_point = latest.saturating_sub(days.saturating_mul(SECONDS_PER_DAY));
        let (train, test) = self.split_at(sessions, split_point);
        Split {
            train,
            test,
            validation: None,
        }
    }

    /// Trailing-day split of the whole set, then the same rule applied
    /// to the train side for a validation set.
    pub fn split_with_validation(&self, sessions: &[Session]) -> Split {
        let mut split = self.split_last_days(sessions, 1);

        let inner = self.split_last_days(&split.train, 1);
        split.validation = Some(ValidationSplit {
            train: inner.train,
            validation: inner.test,
        });
        split
    }

    /// Drop cold items and too-short sessions from an evaluation
    /// candidate set.
    fn clean_evaluation(&self, train: &[Session], candidates: Vec<Session>) -> Vec<Session> {
        let known: HashSet<ItemId> = item_set(train);

        candidates
            .into_iter()
            .filter_map(|s| match self.cold_items {
                ColdItemPolicy::DropSession => {
                    let cold_free = s.events().iter().all(|e| known.contains(&e.item_id));
                    cold_free.then_some(s)
                }
                ColdItemPolicy::DropEvents => s.retain_events(|e| known.contains(&e.item_id)),
            })
            .filter(|s| s.len() >= MIN_EVAL_SESSION_LENGTH)
            .collect()
    }
}
