// ============================================================
// Layer 4 — Event Normaliser
// ============================================================
// Turns raw rows into InteractionRecords.
//
// For every row:
//   1. timestamp, user and item must be present and numeric,
//      otherwise the row is counted as malformed and dropped
//   2. the event label must be known, otherwise it is counted
//      as irrelevant and dropped
//   3. the routing table decides whether the event type is kept
//      for sessions (primary), kept for the side channel, or
//      discarded
//   4. the timestamp is converted to whole seconds
//
// Output order follows input order. The sessionizer sorts.

use serde::{Deserialize, Serialize};

use crate::domain::interaction::{EventType, InteractionRecord, TimestampUnit};
use crate::domain::traits::RawRecord;

/// Where an event type goes after normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Becomes part of the sessions that get filtered and split
    Primary,
    /// Kept with its session id and written to the buys file untouched
    Side,
    /// Dropped during normalisation
    Discard,
}

/// Routing table for the three event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRouting {
    pub view: Route,
    pub add_to_cart: Route,
    pub purchase: Route,
}

impl EventRouting {
    pub fn route(&self, event_type: EventType) -> Route {
        match event_type {
            EventType::View => self.view,
            EventType::AddToCart => self.add_to_cart,
            EventType::Purchase => self.purchase,
        }
    }
}

impl Default for EventRouting {
    /// Views feed the sessions, cart additions go to the side
    /// channel, purchases are dropped.
    fn default() -> Self {
        Self {
            view: Route::Primary,
            add_to_cart: Route::Side,
            purchase: Route::Discard,
        }
    }
}

/// Counts reported back to the caller after normalisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Rows seen
    pub total: usize,
    /// Rows that became records
    pub kept: usize,
    /// Rows missing a required field or holding a non-numeric one
    pub malformed: usize,
    /// Rows with an unknown label or a discarded event type
    pub irrelevant: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<InteractionRecord>,
    pub report: NormalizeReport,
}

pub struct Normalizer {
    unit: TimestampUnit,
    routing: EventRouting,
}

impl Normalizer {
    pub fn new(unit: TimestampUnit, routing: EventRouting) -> Self {
        Self { unit, routing }
    }

    pub fn normalize(&self, rows: &[RawRecord]) -> Normalized {
        let mut report = NormalizeReport {
            total: rows.len(),
            ..NormalizeReport::default()
        };
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let Some((timestamp, user_id, item_id)) = parse_required(row) else {
                report.malformed += 1;
                continue;
            };

            let label = row.event.as_deref().unwrap_or_default();
            let event_type = match EventType::from_label(label) {
                Some(t) if self.routing.route(t) != Route::Discard => t,
                _ => {
                    report.irrelevant += 1;
                    continue;
                }
            };

            records.push(InteractionRecord::new(
                user_id,
                item_id,
                event_type,
                self.unit.to_seconds(timestamp),
            ));
        }

        report.kept = records.len();
        tracing::debug!(
            "Normalised {} rows: {} kept, {} malformed, {} irrelevant",
            report.total,
            report.kept,
            report.malformed,
            report.irrelevant
        );

        Normalized { records, report }
    }
}

/// Timestamp, user and item parsed from a row, or `None` if any
/// of them is missing or not a number.
fn parse_required(row: &RawRecord) -> Option<(i64, u64, u64)> {
    let timestamp = field(&row.timestamp)?.parse::<i64>().ok()?;
    let user = field(&row.user)?.parse::<u64>().ok()?;
    let item = field(&row.item)?.parse::<u64>().ok()?;
    Some((timestamp, user, item))
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
