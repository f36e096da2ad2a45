//! Timezone-resolved calendar-day identity.
//!
//! A `DateKey` is the unit of "same day" used by habit and rollover
//! completion semantics. Two instants share a key iff they fall on the same
//! local calendar day in the supplied zone, so the zone is always an explicit
//! argument and never read from the environment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Calendar-day key, rendered as `YYYY-MM-DD`.
///
/// Derived `Ord` on the inner date matches lexicographic order of the
/// rendered string, so either representation can be used for range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Resolve an absolute instant to the local calendar day in `tz`.
    ///
    /// Exact local midnight belongs to the new day.
    pub fn from_instant(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self(instant.with_timezone(&tz).date_naive())
    }

    /// The key for "today" as seen from `now` in `tz`.
    ///
    /// `now` is explicit so callers stay deterministic under test.
    pub fn today(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::from_instant(now, tz)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` string; `None` if it is not a valid date.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Self)
    }

    pub fn next_day(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    pub fn previous_day(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid date key: {s}"))
    }
}
