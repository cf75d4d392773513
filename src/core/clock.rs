//! Wall-clock source and time formatting.
//!
//! Rules never look at time. Timestamps are only kept so a frame and each
//! player's time at the table can be shown, and so save games can be ordered.
//! All values are milliseconds since the Unix epoch, with 0 meaning "unset".

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// The system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Format a duration as `MM:SS`. Minutes are not wrapped into hours.
///
/// ```
/// use piste_on_piste::core::clock::format_ms;
///
/// assert_eq!(format_ms(0), "00:00");
/// assert_eq!(format_ms(83_900), "01:23");
/// assert_eq!(format_ms(6_000_000), "100:00");
/// ```
#[must_use]
pub fn format_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format a timestamp as a UTC date, `YYYY-MM-DD`. Empty for 0.
#[must_use]
pub fn format_date(timestamp_ms: u64) -> String {
    format_timestamp(timestamp_ms, "%Y-%m-%d")
}

/// Format a timestamp as a UTC time of day, `HH:MM:SS`. Empty for 0.
#[must_use]
pub fn format_time(timestamp_ms: u64) -> String {
    format_timestamp(timestamp_ms, "%H:%M:%S")
}

fn format_timestamp(timestamp_ms: u64, fmt: &str) -> String {
    if timestamp_ms == 0 {
        return String::new();
    }

    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_default()
}
