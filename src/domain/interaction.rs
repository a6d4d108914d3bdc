// ============================================================
// Layer 3 — Interaction Domain Types
// ============================================================
// A single user/item interaction after normalisation.
//
//   user_id    — who acted
//   item_id    — what they acted on
//   event_type — view, add-to-cart or purchase
//   timestamp  — whole Unix seconds
//
// Records are built once by the normaliser and never mutated.
// Every later stage copies or moves them into new collections.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::ConfigError;

/// Alias for user identifiers.
pub type UserId = u64;
/// Alias for item identifiers.
pub type ItemId = u64;
/// Alias for session identifiers.
pub type SessionId = u64;
/// Alias for Unix timestamps in whole seconds.
pub type Timestamp = i64;

/// Seconds in one day, used by every day-based window.
pub const SECONDS_PER_DAY: Timestamp = 86_400;

/// The kind of interaction recorded in the raw log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    AddToCart,
    Purchase,
}

impl EventType {
    /// Parse a raw event label. Returns `None` for labels the
    /// pipeline does not know about.
    ///
    /// Accepts both the RetailRocket spelling (`addtocart`,
    /// `transaction`) and the snake_case names used in configs.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "view" => Some(Self::View),
            "addtocart" | "add_to_cart" | "cart" => Some(Self::AddToCart),
            "transaction" | "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::View => "view",
            Self::AddToCart => "add_to_cart",
            Self::Purchase => "purchase",
        };
        f.write_str(s)
    }
}

/// Unit of the timestamp column in the raw log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

impl TimestampUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
        }
    }

    /// Convert a raw timestamp to whole seconds.
    /// Millisecond values are truncated toward zero.
    pub fn to_seconds(self, raw: i64) -> Timestamp {
        match self {
            Self::Seconds => raw,
            Self::Milliseconds => raw / 1000,
        }
    }
}

impl std::str::FromStr for TimestampUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "seconds" => Ok(Self::Seconds),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            other => Err(ConfigError::UnknownTimestampUnit(other.to_string())),
        }
    }
}

impl TryFrom<String> for TimestampUnit {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimestampUnit> for String {
    fn from(unit: TimestampUnit) -> Self {
        unit.as_str().to_string()
    }
}

/// One normalised interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub event_type: EventType,
    pub timestamp: Timestamp,
}

impl InteractionRecord {
    pub fn new(user_id: UserId, item_id: ItemId, event_type: EventType, timestamp: Timestamp) -> Self {
        Self {
            user_id,
            item_id,
            event_type,
            timestamp,
        }
    }

    /// Shorthand for a view event, which is what most tests need.
    pub fn view(user_id: UserId, item_id: ItemId, timestamp: Timestamp) -> Self {
        Self::new(user_id, item_id, EventType::View, timestamp)
    }
}

/// A side-channel row (e.g. a cart addition) that keeps the id of
/// the session it happened in, but is never filtered or split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEvent {
    pub session_id: SessionId,
    pub timestamp: Timestamp,
    pub item_id: ItemId,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_labels() {
        assert_eq!(EventType::from_label("view"), Some(EventType::View));
        assert_eq!(EventType::from_label("addtocart"), Some(EventType::AddToCart));
        assert_eq!(EventType::from_label(" Transaction "), Some(EventType::Purchase));
        assert_eq!(EventType::from_label("wishlist"), None);
    }

    #[test]
    fn test_millis_truncate_to_seconds() {
        assert_eq!(TimestampUnit::Milliseconds.to_seconds(1_433_221_332_117), 1_433_221_332);
        assert_eq!(TimestampUnit::Seconds.to_seconds(42), 42);
    }

    #[test]
    fn test_unknown_timestamp_unit_is_rejected() {
        assert!("ms".parse::<TimestampUnit>().is_ok());
        assert!(matches!(
            "minutes".parse::<TimestampUnit>(),
            Err(ConfigError::UnknownTimestampUnit(_))
        ));
    }
}
