//! Actuator port: drives the machine's physical buttons.

use std::future::Future;

use brewhub_domain::actuator::{ActuatorId, ActuatorLevel};
use brewhub_domain::error::BrewError;

/// Sets physical actuators to a logical level.
///
/// Implementations only report whether the command was issued; confirming
/// that the hardware actually moved is out of scope.
pub trait Actuator {
    /// Drive `actuator` to `level`.
    fn set(
        &self,
        actuator: &ActuatorId,
        level: ActuatorLevel,
    ) -> impl Future<Output = Result<(), BrewError>> + Send;
}

impl<T: Actuator + Send + Sync> Actuator for std::sync::Arc<T> {
    fn set(
        &self,
        actuator: &ActuatorId,
        level: ActuatorLevel,
    ) -> impl Future<Output = Result<(), BrewError>> + Send {
        (**self).set(actuator, level)
    }
}
