//! Time helpers and the daily quota reset schedule.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for log fields and status snapshots.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Wall-clock hour at which every service's quota is reset.
///
/// The check is time-of-day based: it matches only when the minute is `0`
/// and the hour equals [`hour`](Self::hour), so with minute-granular ticks
/// it fires at most once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSchedule {
    hour: u32,
}

impl Default for ResetSchedule {
    fn default() -> Self {
        Self { hour: 3 }
    }
}

impl ResetSchedule {
    /// Build a schedule for the given hour of day.
    ///
    /// Returns `None` if `hour` is not in `0..24`.
    #[must_use]
    pub fn at_hour(hour: u32) -> Option<Self> {
        (hour < 24).then_some(Self { hour })
    }

    /// The configured reset hour.
    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    /// Whether a tick fired at `time` should reset the quotas.
    #[must_use]
    pub fn is_due(self, time: NaiveTime) -> bool {
        time.minute() == 0 && time.hour() == self.hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_default_to_three_oclock() {
        assert_eq!(ResetSchedule::default().hour(), 3);
    }

    #[test]
    fn should_be_due_only_on_the_hour() {
        let schedule = ResetSchedule::default();
        assert!(schedule.is_due(at(3, 0)));
        assert!(!schedule.is_due(at(3, 1)));
        assert!(!schedule.is_due(at(2, 59)));
        assert!(!schedule.is_due(at(4, 0)));
    }

    #[test]
    fn should_ignore_seconds_within_the_reset_minute() {
        let schedule = ResetSchedule::at_hour(0).unwrap();
        assert!(schedule.is_due(NaiveTime::from_hms_opt(0, 0, 42).unwrap()));
    }

    #[test]
    fn should_reject_out_of_range_hour() {
        assert!(ResetSchedule::at_hour(24).is_none());
        assert!(ResetSchedule::at_hour(23).is_some());
    }
}
