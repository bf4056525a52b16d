//! Time-of-day types and the drift-correcting wait computation.
//!
//! The alarm never arms a single absolute timer. Instead the scheduler
//! re-reads the clock on every iteration and asks [`next_wait`] how long to
//! sleep, so a clock that is stepped forward or back mid-wait is corrected
//! on the next iteration.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// UTC timestamp used for event times.
pub type Timestamp = DateTime<Utc>;

/// Number of seconds in a day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Below or at this many seconds the scheduler waits the exact remainder.
pub const EXACT_WAIT_THRESHOLD_SECS: u32 = 60;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// A wall-clock reading, reduced to the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Build a reading from hours, minutes and seconds.
    ///
    /// Returns `None` when any component is out of range.
    #[must_use]
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self)
    }

    /// Build a reading from a number of seconds since midnight, wrapping
    /// past the end of the day.
    #[must_use]
    pub fn from_seconds_of_day(seconds: u64) -> Self {
        let secs = u32::try_from(seconds % u64::from(SECONDS_PER_DAY)).unwrap_or_default();
        Self(
            NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    #[must_use]
    pub fn second(self) -> u32 {
        self.0.second()
    }
}

impl<T: Timelike> From<&T> for ClockTime {
    fn from(value: &T) -> Self {
        // chrono encodes leap seconds in the nanoseconds, so second() never exceeds 59
        Self::from_hms(value.hour(), value.minute(), value.second())
            .unwrap_or(Self(NaiveTime::MIN))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// A daily alarm target, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAlarmTime")]
pub struct AlarmTime {
    hour: u32,
    minute: u32,
}

#[derive(Deserialize)]
struct RawAlarmTime {
    hour: u32,
    minute: u32,
}

impl TryFrom<RawAlarmTime> for AlarmTime {
    type Error = ValidationError;

    fn try_from(raw: RawAlarmTime) -> Result<Self, Self::Error> {
        Self::new(raw.hour, raw.minute)
    }
}

impl AlarmTime {
    /// Create an alarm time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::HourOutOfRange`] or
    /// [`ValidationError::MinuteOutOfRange`] for values outside a day.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Seconds from `now` until the next occurrence of `target`, in `[0, 86399]`.
///
/// A target equal to the current second yields `0`; a target that passed
/// earlier in the current minute rolls over to the next day.
#[must_use]
pub fn seconds_until(now: ClockTime, target: AlarmTime) -> u32 {
    let hours = (24 + i64::from(target.hour) - i64::from(now.hour())).rem_euclid(24);
    let minutes = i64::from(target.minute) - i64::from(now.minute());
    let raw = hours * 3600 + minutes * 60 - i64::from(now.second());
    let normalized = raw.rem_euclid(i64::from(SECONDS_PER_DAY));
    u32::try_from(normalized).unwrap_or_default()
}

/// One iteration of the wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStep {
    /// Wait this many seconds, then fire.
    Final(u32),
    /// Wait this many seconds, then re-read the clock.
    Partial(u32),
}

impl WaitStep {
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::Final(secs) | Self::Partial(secs) => Duration::from_secs(u64::from(secs)),
        }
    }
}

/// Decide the next wait given the remaining seconds.
///
/// Halving the remainder keeps the number of iterations logarithmic while
/// re-checking the clock more often as the deadline approaches.
#[must_use]
pub fn next_wait(delta_secs: u32) -> WaitStep {
    if delta_secs <= EXACT_WAIT_THRESHOLD_SECS {
        WaitStep::Final(delta_secs)
    } else {
        WaitStep::Partial(delta_secs / 2)
    }
}
