//! Processing clocks

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use contracts::{Clock, Time};

/// Wall clock, read at processing time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        stamp_from_utc(Utc::now())
    }
}

/// `sec` is `int32` on the wire; instants past 2038-01-19 saturate at `i32::MAX`
fn stamp_from_utc(instant: DateTime<Utc>) -> Time {
    match i32::try_from(instant.timestamp()) {
        Ok(sec) => Time::new(sec, instant.timestamp_subsec_nanos()),
        Err(_) if instant.timestamp() < 0 => Time::new(i32::MIN, 0),
        Err(_) => Time::new(i32::MAX, 999_999_999),
    }
}

/// Externally driven clock
///
/// Holds nanoseconds since epoch. Used by tests, and by hosts that run on
/// simulated time.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicI64,
}

impl ManualClock {
    const NANOS_PER_SEC: i64 = 1_000_000_000;

    /// Create a clock stopped at `time`
    pub fn new(time: Time) -> Self {
        let clock = Self::default();
        clock.set(time);
        clock
    }

    /// Jump to `time`
    pub fn set(&self, time: Time) {
        let nanos = time.sec as i64 * Self::NANOS_PER_SEC + time.nanosec as i64;
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    /// Move forward by `nanos`
    pub fn advance_nanos(&self, nanos: i64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        let nanos = self.nanos.load(Ordering::SeqCst);
        Time::new(
            nanos.div_euclid(Self::NANOS_PER_SEC) as i32,
            nanos.rem_euclid(Self::NANOS_PER_SEC) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        let t = SystemClock.now();
        // 2020-01-01T00:00:00Z
        assert!(t.sec > 1_577_836_800);
        assert!(t.nanosec < 1_000_000_000);
    }

    #[test]
    fn test_stamp_saturates_past_int32() {
        let last = DateTime::from_timestamp(i32::MAX as i64, 5).unwrap();
        assert_eq!(stamp_from_utc(last), Time::new(i32::MAX, 5));

        let after = DateTime::from_timestamp(i32::MAX as i64 + 3600, 0).unwrap();
        assert_eq!(stamp_from_utc(after), Time::new(i32::MAX, 999_999_999));

        let before = DateTime::from_timestamp(i32::MIN as i64 - 1, 0).unwrap();
        assert_eq!(stamp_from_utc(before), Time::new(i32::MIN, 0));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(Time::new(10, 900_000_000));
        assert_eq!(clock.now(), Time::new(10, 900_000_000));

        clock.advance_nanos(200_000_000);
        assert_eq!(clock.now(), Time::new(11, 100_000_000));

        clock.set(Time::new(3, 0));
        assert_eq!(clock.now(), Time::new(3, 0));
    }
}
