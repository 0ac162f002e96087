//! Time source for audit stamping.
//!
//! # Responsibility
//! - Provide "now" in epoch milliseconds behind an injectable trait.
//! - Offer a manual clock for deterministic tests and tooling.

use crate::model::persistent::EpochMillis;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current time used for audit metadata.
pub trait Clock: Send + Sync {
    fn now(&self) -> EpochMillis;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: EpochMillis) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: EpochMillis) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward and returns the new time.
    pub fn advance(&self, millis: EpochMillis) -> EpochMillis {
        self.now.fetch_add(millis, Ordering::SeqCst) + millis
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}

/// UTC calendar date of an epoch-millisecond timestamp.
pub fn date_of(millis: EpochMillis) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|time| time.date_naive())
}

#[cfg(test)]
mod tests {
    use super::{date_of, Clock, ManualClock};
    use chrono::NaiveDate;

    #[test]
    fn manual_clock_advances_only_on_request() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.advance(5), 1_005);
        assert_eq!(clock.now(), 1_005);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn date_of_uses_utc_calendar_day() {
        assert_eq!(date_of(0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(
            date_of(1_700_000_000_000),
            NaiveDate::from_ymd_opt(2023, 11, 14)
        );
    }
}
