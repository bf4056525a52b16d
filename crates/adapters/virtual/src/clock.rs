//! Host wall clock.

use chrono::{FixedOffset, Offset, Utc};

use brewhub_app::ports::Clock;
use brewhub_domain::error::BrewError;
use brewhub_domain::time::ClockTime;

/// Reads the host clock and shifts it to the appliance's local time.
///
/// Keeping the host clock synchronized (NTP, RTC) is left to the OS; the
/// scheduler re-reads this clock on every wait so steps are tolerated.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// A clock reporting UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Result<ClockTime, BrewError> {
        let local = Utc::now().with_timezone(&self.offset);
        Ok(ClockTime::from(&local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn seconds_of_day(t: ClockTime) -> i64 {
        i64::from(t.hour() * 3600 + t.minute() * 60 + t.second())
    }

    #[test]
    fn should_report_host_utc_time() {
        let before = Utc::now().num_seconds_from_midnight();
        let reading = SystemClock::utc().now().unwrap();
        let after = Utc::now().num_seconds_from_midnight();

        let secs = seconds_of_day(reading);
        // tolerate a midnight rollover between the reads
        assert!(
            (i64::from(before)..=i64::from(after)).contains(&secs) || after < before,
            "{reading} not between {before} and {after}"
        );
    }

    #[test]
    fn should_shift_reading_by_offset() {
        let utc = SystemClock::utc();
        let shifted = SystemClock::new(FixedOffset::east_opt(2 * 3600).unwrap());

        let a = seconds_of_day(utc.now().unwrap());
        let b = seconds_of_day(shifted.now().unwrap());

        let diff = (b - a).rem_euclid(86_400);
        assert!((7199..=7201).contains(&diff), "offset was {diff}s");
    }
}
