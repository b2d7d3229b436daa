use chrono::{Duration, FixedOffset, NaiveDateTime, NaiveTime};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::utils::Clock;

/// Seconds since the unix epoch.
pub type Timestamp = i64;

/// A daily trading session in market-local time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    open: NaiveTime,
    close: NaiveTime,
    utc_offset_minutes: i32,
    local_timestamps: bool,
}

impl Default for Session {
    /// The NSE cash session: 09:15 to 15:30, India Standard Time.
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            utc_offset_minutes: 5 * 60 + 30,
            local_timestamps: true,
        }
    }
}

impl Session {
    /// Creates a session from its open, close and UTC offset in minutes.
    ///
    /// ### Returns
    /// The session, or `InvalidSession` if `close` is not after `open` or the offset is
    /// not a valid UTC offset.
    pub fn new(open: NaiveTime, close: NaiveTime, utc_offset_minutes: i32) -> Result<Self> {
        let session = Self {
            open,
            close,
            utc_offset_minutes,
            ..Self::default()
        };
        session.validate()?;
        Ok(session)
    }

    /// Chooses how session-local times become timestamps.
    ///
    /// With `true` (the default) the market-local wall time is written as if it were UTC,
    /// which is what chart libraries that render timestamps in UTC expect: the 09:15 bar is
    /// labelled 09:15. With `false` timestamps are the true instants.
    pub fn local_timestamps(mut self, local: bool) -> Self {
        self.local_timestamps = local;
        self
    }

    /// Returns the session open.
    pub fn open(&self) -> NaiveTime {
        self.open
    }

    /// Returns the session close.
    pub fn close(&self) -> NaiveTime {
        self.close
    }

    fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(Error::InvalidSession)
    }

    fn validate(&self) -> Result<()> {
        if self.close <= self.open {
            return Err(Error::InvalidSession);
        }
        self.offset().map(|_| ())
    }

    fn to_timestamp(&self, local: NaiveDateTime) -> Timestamp {
        let wall = local.and_utc().timestamp();
        if self.local_timestamps {
            wall
        } else {
            wall - i64::from(self.utc_offset_minutes) * 60
        }
    }
}

/// How the time grid is anchored.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum TimeGridPolicy {
    /// Starts at the current (or previous) session open and only emits session minutes.
    SessionAware(Session),
    /// Ends at "now" and walks backward with no session boundaries.
    TrailingWindow,
}

impl Default for TimeGridPolicy {
    fn default() -> Self {
        Self::SessionAware(Session::default())
    }
}

/// Generates `points` ascending bar timestamps spaced `interval_minutes` apart.
///
/// ### Arguments
/// * `interval_minutes` - Bar size in minutes.
/// * `points` - Number of timestamps to emit.
/// * `policy` - Session-aware or trailing-window anchoring.
/// * `clock` - Source of "now".
///
/// ### Returns
/// The timestamps, or `InvalidInterval` / `InvalidSession`.
pub fn generate_time_grid<C>(
    interval_minutes: u32,
    points: usize,
    policy: &TimeGridPolicy,
    clock: &C,
) -> Result<Vec<Timestamp>>
where
    C: Clock + ?Sized,
{
    if interval_minutes == 0 {
        return Err(Error::InvalidInterval(interval_minutes));
    }

    let grid = match policy {
        TimeGridPolicy::SessionAware(session) => session_grid(interval_minutes, points, session, clock)?,
        TimeGridPolicy::TrailingWindow => trailing_grid(interval_minutes, points, clock),
    };

    debug!(
        "time grid: {} points every {}m, first {:?}, last {:?}",
        grid.len(),
        interval_minutes,
        grid.first(),
        grid.last()
    );
    Ok(grid)
}

fn session_grid<C>(interval_minutes: u32, points: usize, session: &Session, clock: &C) -> Result<Vec<Timestamp>>
where
    C: Clock + ?Sized,
{
    session.validate()?;

    let local_now = clock.now().with_timezone(&session.offset()?).naive_local();
    let mut day = local_now.date();
    if local_now.time() < session.open {
        day = day.pred_opt().ok_or(Error::InvalidTimestamp(clock.now().timestamp()))?;
    }

    let step = Duration::minutes(i64::from(interval_minutes));
    let mut current = day.and_time(session.open);
    let mut grid = Vec::with_capacity(points);

    for _ in 0..points {
        grid.push(session.to_timestamp(current));
        current += step;
        // past the close: the next bar is the following day's open
        if current.time() > session.close {
            let next_day = current
                .date()
                .succ_opt()
                .ok_or(Error::InvalidTimestamp(session.to_timestamp(current)))?;
            current = next_day.and_time(session.open);
        }
    }

    Ok(grid)
}

fn trailing_grid<C>(interval_minutes: u32, points: usize, clock: &C) -> Vec<Timestamp>
where
    C: Clock + ?Sized,
{
    let now = clock.now().timestamp();
    let step = i64::from(interval_minutes) * 60;

    (0..points)
        .rev()
        .map(|back| now - back as i64 * step)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Timelike};

    use super::*;
    use crate::utils::FixedClock;

    // 2025-08-05 and 2025-08-04 in IST
    fn ist(day: u32, hour: u32, minute: u32) -> FixedClock {
        let local = NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        FixedClock::new(DateTime::from_naive_utc_and_offset(local - Duration::minutes(330), chrono::Utc))
    }

    fn wall(timestamp: Timestamp) -> NaiveDateTime {
        DateTime::from_timestamp(timestamp, 0).unwrap().naive_utc()
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = generate_time_grid(0, 10, &TimeGridPolicy::default(), &ist(5, 12, 0));
        assert!(matches!(result, Err(Error::InvalidInterval(0))));
    }

    #[test]
    fn zero_points_is_empty() {
        let grid = generate_time_grid(5, 0, &TimeGridPolicy::default(), &ist(5, 12, 0)).unwrap();
        assert!(grid.is_empty());
        let grid = generate_time_grid(5, 0, &TimeGridPolicy::TrailingWindow, &ist(5, 12, 0)).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn session_starts_at_todays_open() {
        let grid = generate_time_grid(15, 3, &TimeGridPolicy::default(), &ist(5, 12, 0)).unwrap();
        let first = wall(grid[0]);
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
        assert_eq!((first.hour(), first.minute()), (9, 15));
        assert_eq!(grid[1] - grid[0], 15 * 60);
        assert_eq!(grid[2] - grid[1], 15 * 60);
    }

    #[test]
    fn session_before_open_uses_yesterday() {
        let grid = generate_time_grid(15, 1, &TimeGridPolicy::default(), &ist(5, 9, 14)).unwrap();
        let first = wall(grid[0]);
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2025, 8, 4).unwrap());
        assert_eq!((first.hour(), first.minute()), (9, 15));

        let grid = generate_time_grid(15, 1, &TimeGridPolicy::default(), &ist(5, 9, 15)).unwrap();
        assert_eq!(wall(grid[0]).date(), NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
    }

    #[test]
    fn session_jumps_to_next_open_after_close() {
        // 09:15 .. 15:15 is 25 fifteen-minute bars, 15:30 is the 26th and still in session
        let grid = generate_time_grid(15, 28, &TimeGridPolicy::default(), &ist(5, 10, 0)).unwrap();
        let close = wall(grid[25]);
        assert_eq!((close.hour(), close.minute()), (15, 30));

        let next = wall(grid[26]);
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2025, 8, 6).unwrap());
        assert_eq!((next.hour(), next.minute()), (9, 15));
        assert_eq!(grid[27] - grid[26], 15 * 60);
    }

    #[test]
    fn session_instant_timestamps_are_shifted_by_offset() {
        let local = TimeGridPolicy::default();
        let instant = TimeGridPolicy::SessionAware(Session::default().local_timestamps(false));
        let clock = ist(5, 12, 0);

        let local = generate_time_grid(5, 4, &local, &clock).unwrap();
        let instant = generate_time_grid(5, 4, &instant, &clock).unwrap();
        for (l, i) in local.iter().zip(&instant) {
            assert_eq!(l - i, 330 * 60);
        }
        // 09:15 IST is 03:45 UTC
        let first = wall(instant[0]);
        assert_eq!((first.hour(), first.minute()), (3, 45));
    }

    #[test]
    fn session_rejects_inverted_hours() {
        let open = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        let close = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(matches!(Session::new(open, close, 0), Err(Error::InvalidSession)));
        assert!(matches!(Session::new(close, open, 24 * 60), Err(Error::InvalidSession)));
        assert!(Session::new(close, open, -300).is_ok());
    }

    #[test]
    fn session_rejects_overflowing_offset() {
        let open = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let close = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        assert!(matches!(Session::new(open, close, i32::MAX), Err(Error::InvalidSession)));
        assert!(matches!(Session::new(open, close, i32::MIN), Err(Error::InvalidSession)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn session_config_fills_defaults() {
        let policy: TimeGridPolicy =
            serde_json::from_str(r#"{"sessionAware": {"open": "10:00:00", "close": "14:00:00"}}"#).unwrap();
        let TimeGridPolicy::SessionAware(session) = policy else {
            panic!("expected a session policy");
        };
        assert_eq!(session.open(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(session.close(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(session.utc_offset_minutes, 330);
        assert!(session.local_timestamps);

        let bad: TimeGridPolicy = serde_json::from_str(r#"{"sessionAware": {"utcOffsetMinutes": 2147483647}}"#).unwrap();
        let result = generate_time_grid(5, 3, &bad, &ist(5, 12, 0));
        assert!(matches!(result, Err(Error::InvalidSession)));
    }

    #[test]
    fn trailing_window_ends_now() {
        let clock = FixedClock::from_timestamp(1_754_380_805).unwrap();
        let grid = generate_time_grid(5, 4, &TimeGridPolicy::TrailingWindow, &clock).unwrap();
        assert_eq!(
            grid,
            vec![
                1_754_380_805 - 900,
                1_754_380_805 - 600,
                1_754_380_805 - 300,
                1_754_380_805
            ]
        );
    }

    #[test]
    fn large_interval_still_increases() {
        let grid = generate_time_grid(24 * 60, 5, &TimeGridPolicy::default(), &ist(5, 12, 0)).unwrap();
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }
}
