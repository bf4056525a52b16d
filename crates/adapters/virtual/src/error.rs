//! Virtual adapter error types.

use brewhub_domain::actuator::ActuatorId;
use brewhub_domain::error::BrewError;

/// Errors specific to the virtual hardware.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The bank has no actuator with this name.
    #[error("unknown actuator")]
    UnknownActuator(ActuatorId),
}

impl From<VirtualError> for BrewError {
    fn from(err: VirtualError) -> Self {
        let actuator = match &err {
            VirtualError::UnknownActuator(actuator) => actuator.clone(),
        };
        BrewError::Actuator {
            actuator,
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_unknown_actuator_into_actuator_error() {
        let id = ActuatorId::new("grinder").unwrap();
        let err: BrewError = VirtualError::UnknownActuator(id.clone()).into();
        match err {
            BrewError::Actuator { actuator, source } => {
                assert_eq!(actuator, id);
                assert_eq!(source.to_string(), "unknown actuator");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
