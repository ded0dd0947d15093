//! All things time-related.

pub use chrono::{DateTime, NaiveDate, Utc};

/// Earliest date harvested when `--gabs_after` is not given.
pub const DEFAULT_AFTER: &str = "2000-01-01";

/// Latest date harvested when `--gabs_before` is not given.
pub const DEFAULT_BEFORE: &str = "2030-01-01";

/// Where a timestamp falls relative to a [`DateWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// Later than the window's last day.
    Newer,

    /// On or between the window's first and last days.
    Within,

    /// Earlier than the window's first day.
    Older,
}

/// An inclusive range of calendar days (in UTC) used to bound a harvest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    after: NaiveDate,
    before: NaiveDate,
}

impl DateWindow {
    /// Creates a window covering `after` through `before`, inclusive.
    pub fn new(after: NaiveDate, before: NaiveDate) -> Self {
        Self { after, before }
    }

    /// A window that is only bounded below.
    pub fn starting(after: NaiveDate) -> Self {
        Self {
            after,
            ..Self::default()
        }
    }

    /// First day of the window.
    pub fn after(&self) -> NaiveDate {
        self.after
    }

    /// Last day of the window.
    pub fn before(&self) -> NaiveDate {
        self.before
    }

    /// Places an API timestamp relative to the window.
    ///
    /// Returns `None` if `timestamp` is not an RFC 3339 date-time.
    pub fn locate(&self, timestamp: &str) -> Option<Position> {
        let day = parse_timestamp(timestamp)?.date_naive();
        let position = if day > self.before {
            Position::Newer
        } else if day < self.after {
            Position::Older
        } else {
            Position::Within
        };
        Some(position)
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            after: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            before: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Parses a `created_at` timestamp as returned by the Gab API.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
