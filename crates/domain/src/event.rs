//! Event: an immutable record of something that happened.
//!
//! Events are produced when an alarm is scheduled, cancelled or fires and
//! while a brew runs. They are broadcast in-process and streamed to HTTP
//! clients; nothing persists them.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{Timestamp, now};

/// Kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AlarmScheduled,
    AlarmCancelled,
    AlarmFired,
    /// The alarm fired while a brew was already running.
    AlarmSkipped,
    BrewStarted,
    BrewStepCompleted,
    BrewFinished,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AlarmScheduled => "alarm_scheduled",
            Self::AlarmCancelled => "alarm_cancelled",
            Self::AlarmFired => "alarm_fired",
            Self::AlarmSkipped => "alarm_skipped",
            Self::BrewStarted => "brew_started",
            Self::BrewStepCompleted => "brew_step_completed",
            Self::BrewFinished => "brew_finished",
        };
        f.write_str(name)
    }
}

/// A timestamped domain event with a free-form JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub timestamp: Timestamp,
    pub data: serde_json::Value,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            timestamp: now(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_new_event_with_fresh_id() {
        let a = Event::new(EventType::BrewStarted, serde_json::json!({}));
        let b = Event::new(EventType::BrewStarted, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_serialize_event_type_in_snake_case() {
        let event = Event::new(EventType::AlarmFired, serde_json::json!({"hour": 7}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "alarm_fired");
        assert_eq!(json["data"]["hour"], 7);
    }

    #[test]
    fn should_match_display_with_serialized_name() {
        let json = serde_json::to_value(EventType::BrewStepCompleted).unwrap();
        assert_eq!(json, EventType::BrewStepCompleted.to_string());
    }
}
