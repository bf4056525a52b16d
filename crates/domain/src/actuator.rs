//! Actuators and the fixed brew sequence.
//!
//! The machine is driven by pressing and releasing its front-panel buttons.
//! A [`Sequence`] is plain data: an ordered list of [`ActuatorStep`]s that the
//! sequencer replays, so the brew recipe can be replaced from configuration
//! without touching execution logic.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name of a physical actuator (e.g. `"heater"`, `"pump"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActuatorId(String);

impl ActuatorId {
    /// Heater button of the default machine.
    pub const HEATER: &'static str = "heater";
    /// Pump button of the default machine.
    pub const PUMP: &'static str = "pump";

    /// Create an actuator id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyActuatorId`] for a blank name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyActuatorId);
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActuatorId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActuatorId> for String {
    fn from(value: ActuatorId) -> Self {
        value.0
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical level of a push-button actuator.
///
/// The electrical polarity is an adapter concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorLevel {
    Pressed,
    #[default]
    Released,
}

impl fmt::Display for ActuatorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressed => f.write_str("pressed"),
            Self::Released => f.write_str("released"),
        }
    }
}

/// Drive one actuator to a level, then hold before the next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorStep {
    pub actuator: ActuatorId,
    pub level: ActuatorLevel,
    /// Time to wait after setting the level, in milliseconds.
    #[serde(default)]
    pub hold_ms: u64,
}

impl ActuatorStep {
    #[must_use]
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

impl fmt::Display for ActuatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}ms)", self.actuator, self.level, self.hold_ms)
    }
}

/// A non-empty, ordered list of actuator steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ActuatorStep>", into = "Vec<ActuatorStep>")]
pub struct Sequence {
    steps: Vec<ActuatorStep>,
}

impl Sequence {
    /// Create a builder for constructing a [`Sequence`].
    #[must_use]
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::default()
    }

    /// Validate and wrap a list of steps.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySequence`] when `steps` is empty.
    pub fn new(steps: Vec<ActuatorStep>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptySequence);
        }
        Ok(Self { steps })
    }

    /// The stock brew recipe: pulse the heater, let the
    /// water boil, run the pump to fill the mug, then pulse the heater off.
    #[must_use]
    pub fn default_brew() -> Self {
        let heater = || ActuatorId(ActuatorId::HEATER.to_string());
        let pump = || ActuatorId(ActuatorId::PUMP.to_string());
        Self {
            steps: vec![
                ActuatorStep {
                    actuator: heater(),
                    level: ActuatorLevel::Pressed,
                    hold_ms: 1_000,
                },
                ActuatorStep {
                    actuator: heater(),
                    level: ActuatorLevel::Released,
                    hold_ms: 120_000,
                },
                ActuatorStep {
                    actuator: pump(),
                    level: ActuatorLevel::Pressed,
                    hold_ms: 60_000,
                },
                ActuatorStep {
                    actuator: pump(),
                    level: ActuatorLevel::Released,
                    hold_ms: 0,
                },
                ActuatorStep {
                    actuator: heater(),
                    level: ActuatorLevel::Pressed,
                    hold_ms: 1_000,
                },
                ActuatorStep {
                    actuator: heater(),
                    level: ActuatorLevel::Released,
                    hold_ms: 0,
                },
            ],
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[ActuatorStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false` for a validated sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of every step's hold time.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(ActuatorStep::hold).sum()
    }

    /// Distinct actuators referenced by the sequence, in first-use order.
    #[must_use]
    pub fn actuators(&self) -> Vec<&ActuatorId> {
        let mut seen: Vec<&ActuatorId> = Vec::new();
        for step in &self.steps {
            if !seen.contains(&&step.actuator) {
                seen.push(&step.actuator);
            }
        }
        seen
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::default_brew()
    }
}

impl TryFrom<Vec<ActuatorStep>> for Sequence {
    type Error = ValidationError;

    fn try_from(steps: Vec<ActuatorStep>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<Sequence> for Vec<ActuatorStep> {
    fn from(value: Sequence) -> Self {
        value.steps
    }
}

/// Step-by-step builder for [`Sequence`].
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    steps: Vec<ActuatorStep>,
}

impl SequenceBuilder {
    #[must_use]
    pub fn step(mut self, actuator: ActuatorId, level: ActuatorLevel, hold: Duration) -> Self {
        self.steps.push(ActuatorStep {
            actuator,
            level,
            hold_ms: u64::try_from(hold.as_millis()).unwrap_or(u64::MAX),
        });
        self
    }

    /// Consume the builder and return a [`Sequence`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySequence`] if no step was added.
    pub fn build(self) -> Result<Sequence, ValidationError> {
        Sequence::new(self.steps)
    }
}
