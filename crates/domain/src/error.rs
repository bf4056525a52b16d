//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BrewError`]
//! at port boundaries.

use crate::actuator::ActuatorId;

/// Top-level error returned by the scheduler, the sequencer and every port.
#[derive(Debug, thiserror::Error)]
pub enum BrewError {
    /// A command carried missing or invalid attributes.
    #[error("malformed command")]
    Validation(#[from] ValidationError),

    /// `schedule` was called while an alarm is already pending or running.
    #[error("an alarm is already scheduled")]
    AlreadyScheduled,

    /// `cancel` was called while no alarm is pending.
    #[error("no alarm is scheduled")]
    NothingScheduled,

    /// A brew was requested while another one is in progress.
    #[error("a brew is already in progress")]
    SequencerBusy,

    /// The wall-clock source could not be read. Transient.
    #[error("failed to read the clock")]
    ClockRead(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An actuator rejected a command.
    #[error("actuator {actuator} failed")]
    Actuator {
        actuator: ActuatorId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Validation failures for user-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("attribute `{name}` has invalid value {value:?}")]
    InvalidAttribute { name: &'static str, value: String },

    #[error("hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),

    #[error("minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),

    #[error("actuator id must not be empty")]
    EmptyActuatorId,

    #[error("sequence must contain at least one step")]
    EmptySequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_brew_error() {
        let err: BrewError = ValidationError::MissingAttribute("hour").into();
        assert!(matches!(
            err,
            BrewError::Validation(ValidationError::MissingAttribute("hour"))
        ));
    }

    #[test]
    fn should_describe_invalid_attribute_with_its_value() {
        let err = ValidationError::InvalidAttribute {
            name: "minutes",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "attribute `minutes` has invalid value \"abc\"");
    }

    #[test]
    fn should_keep_source_for_clock_read_failure() {
        let io = std::io::Error::other("rtc offline");
        let err = BrewError::ClockRead(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "rtc offline");
    }
}
