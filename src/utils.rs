use chrono::{DateTime, Utc};

use crate::engine::Timestamp;
use crate::errors::{Error, Result};

/// Source of the current wall-clock time.
///
/// Generators ask the clock for "now" instead of reading the system time directly,
/// so a [`FixedClock`] makes every run reproducible.
pub trait Clock {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at `datetime`.
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a clock frozen at the given unix timestamp (seconds).
    pub fn from_timestamp(timestamp: Timestamp) -> Result<Self> {
        DateTime::from_timestamp(timestamp, 0)
            .map(Self)
            .ok_or(Error::InvalidTimestamp(timestamp))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Converts a unix timestamp (seconds) to a UTC datetime.
pub fn to_datetime(timestamp: Timestamp) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0).ok_or(Error::InvalidTimestamp(timestamp))
}

#[cfg(feature = "serde")]
/// Reads a generator configuration from the JSON file at `filepath`.
pub fn load_config(filepath: std::path::PathBuf) -> Result<crate::engine::GeneratorConfig> {
    use std::{fs::File, io::BufReader};

    let file = File::open(filepath)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(Error::from)
}

#[cfg(test)]
#[test]
fn fixed_clock_is_frozen() {
    let clock = FixedClock::from_timestamp(1_754_380_800).unwrap();
    assert_eq!(clock.now(), clock.now());
    assert_eq!(clock.now().timestamp(), 1_754_380_800);
}

#[cfg(test)]
#[test]
fn fixed_clock_rejects_out_of_range() {
    assert!(matches!(
        FixedClock::from_timestamp(i64::MAX),
        Err(Error::InvalidTimestamp(i64::MAX))
    ));
}

#[cfg(test)]
#[test]
fn system_clock_moves_forward() {
    let first = SystemClock.now();
    let second = SystemClock.now();
    assert!(second >= first);
}
