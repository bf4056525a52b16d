//! # brewhub-adapter-virtual
//!
//! Virtual hardware for running brewhub without a GPIO board.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`SystemClock`] | `Clock` | Reads the host clock, shifted by a fixed UTC offset |
//! | [`VirtualActuatorBank`] | `Actuator` | Tracks button levels and logs the pin value that would be driven |
//!
//! ## Dependency rule
//!
//! Depends on `brewhub-app` (port traits) and `brewhub-domain` only.

mod actuators;
mod clock;
mod error;

pub use actuators::{ActuatorCommand, HISTORY_CAPACITY, VirtualActuatorBank};
pub use clock::SystemClock;
pub use error::VirtualError;
