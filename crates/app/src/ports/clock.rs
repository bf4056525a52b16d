//! Clock port: the wall-clock time source.
//!
//! The clock may be stepped at any moment by an external synchronization
//! process, so callers must never cache a reading across a wait.

use brewhub_domain::error::BrewError;
use brewhub_domain::time::ClockTime;

/// Supplies the current local time of day.
pub trait Clock {
    /// Read the current time.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::ClockRead`] when the time source is unavailable.
    fn now(&self) -> Result<ClockTime, BrewError>;
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> Result<ClockTime, BrewError> {
        (**self).now()
    }
}
