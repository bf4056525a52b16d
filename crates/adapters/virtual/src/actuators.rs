//! Simulated push-button actuators.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use brewhub_app::ports::Actuator;
use brewhub_domain::actuator::{ActuatorId, ActuatorLevel, Sequence};
use brewhub_domain::error::BrewError;
use brewhub_domain::time::{Timestamp, now};

use crate::error::VirtualError;

/// Number of commands kept in [`VirtualActuatorBank::history`].
pub const HISTORY_CAPACITY: usize = 256;

/// One command received by the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub actuator: ActuatorId,
    pub level: ActuatorLevel,
    /// Electrical value that a real pin would be driven to.
    pub pin_value: u8,
    pub at: Timestamp,
}

/// A bank of simulated buttons.
///
/// Buttons start released. With `active_low` a pressed button drives its
/// pin to `0`.
pub struct VirtualActuatorBank {
    active_low: bool,
    levels: Mutex<BTreeMap<ActuatorId, ActuatorLevel>>,
    history: Mutex<VecDeque<ActuatorCommand>>,
}

impl VirtualActuatorBank {
    /// Create a bank exposing `actuators`.
    pub fn new(actuators: impl IntoIterator<Item = ActuatorId>, active_low: bool) -> Self {
        let levels = actuators
            .into_iter()
            .map(|id| (id, ActuatorLevel::Released))
            .collect();
        Self {
            active_low,
            levels: Mutex::new(levels),
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    /// Create a bank exposing every actuator referenced by `sequence`.
    #[must_use]
    pub fn for_sequence(sequence: &Sequence, active_low: bool) -> Self {
        Self::new(sequence.actuators().into_iter().cloned(), active_low)
    }

    /// Current level of `actuator`, if the bank knows it.
    #[must_use]
    pub fn level(&self, actuator: &ActuatorId) -> Option<ActuatorLevel> {
        lock(&self.levels).get(actuator).copied()
    }

    /// The last [`HISTORY_CAPACITY`] commands received, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ActuatorCommand> {
        lock(&self.history).iter().cloned().collect()
    }

    fn pin_value(&self, level: ActuatorLevel) -> u8 {
        match (level, self.active_low) {
            (ActuatorLevel::Pressed, true) | (ActuatorLevel::Released, false) => 0,
            (ActuatorLevel::Pressed, false) | (ActuatorLevel::Released, true) => 1,
        }
    }

    fn apply(&self, actuator: &ActuatorId, level: ActuatorLevel) -> Result<(), VirtualError> {
        {
            let mut levels = lock(&self.levels);
            let current = levels
                .get_mut(actuator)
                .ok_or_else(|| VirtualError::UnknownActuator(actuator.clone()))?;
            *current = level;
        }

        let pin_value = self.pin_value(level);
        tracing::info!(%actuator, %level, pin_value, "virtual actuator set");
        let mut history = lock(&self.history);
        if history.len() == HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(ActuatorCommand {
            actuator: actuator.clone(),
            level,
            pin_value,
            at: now(),
        });
        Ok(())
    }
}

impl Actuator for VirtualActuatorBank {
    fn set(
        &self,
        actuator: &ActuatorId,
        level: ActuatorLevel,
    ) -> impl Future<Output = Result<(), BrewError>> + Send {
        let result = self.apply(actuator, level).map_err(BrewError::from);
        async { result }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
