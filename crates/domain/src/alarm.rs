//! Alarm status and the snapshot shown on the status display.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::AlarmTime;

/// Label shown while no alarm is set.
pub const IDLE_LABEL: &str = "--:--";

/// Label shown while the alarm-triggered brew is running.
pub const RUNNING_LABEL: &str = "in progress";

/// Lifecycle of the single process-wide alarm.
///
/// Legal transitions: `Idle → Scheduled → Running → Idle`, plus
/// `Scheduled → Idle` on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatus {
    #[default]
    Idle,
    Scheduled,
    Running,
}

impl AlarmStatus {
    /// Whether moving from `self` to `next` is a legal edge.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Scheduled)
                | (Self::Scheduled, Self::Running | Self::Idle)
                | (Self::Running, Self::Idle)
        )
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Scheduled => f.write_str("scheduled"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// Point-in-time view of the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlarmState {
    pub status: AlarmStatus,
    /// The target time while scheduled or running.
    pub target: Option<AlarmTime>,
}

impl AlarmState {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scheduled(target: AlarmTime) -> Self {
        Self {
            status: AlarmStatus::Scheduled,
            target: Some(target),
        }
    }

    #[must_use]
    pub fn running(target: AlarmTime) -> Self {
        Self {
            status: AlarmStatus::Running,
            target: Some(target),
        }
    }

    /// Text for the status display: `--:--`, `HH:MM` or `in progress`.
    #[must_use]
    pub fn display_label(&self) -> String {
        match (self.status, self.target) {
            (AlarmStatus::Scheduled, Some(target)) => target.to_string(),
            (AlarmStatus::Running, _) => RUNNING_LABEL.to_string(),
            _ => IDLE_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_label_idle_alarm_with_dashes() {
        assert_eq!(AlarmState::idle().display_label(), "--:--");
    }

    #[test]
    fn should_label_scheduled_alarm_with_target_time() {
        let state = AlarmState::scheduled(AlarmTime::new(6, 45).unwrap());
        assert_eq!(state.display_label(), "06:45");
    }

    #[test]
    fn should_label_running_alarm_as_in_progress() {
        let state = AlarmState::running(AlarmTime::new(6, 45).unwrap());
        assert_eq!(state.display_label(), "in progress");
    }

    #[test]
    fn should_allow_only_lifecycle_edges() {
        use AlarmStatus::{Idle, Running, Scheduled};

        assert!(Idle.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Running));
        assert!(Scheduled.can_transition_to(Idle));
        assert!(Running.can_transition_to(Idle));

        assert!(!Idle.can_transition_to(Running));
        assert!(!Running.can_transition_to(Scheduled));
        assert!(!Idle.can_transition_to(Idle));
    }

    #[test]
    fn should_serialize_status_in_snake_case() {
        let json = serde_json::to_value(AlarmState::scheduled(AlarmTime::new(7, 0).unwrap()))
            .unwrap();
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["target"]["hour"], 7);
    }
}
