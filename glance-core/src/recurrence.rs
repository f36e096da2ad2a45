//! Recurrence rules: daily / weekly / monthly patterns with interval and
//! optional time-of-day.
//!
//! `next_occurrence` is the single mechanism for advancing rollover tasks.
//! It is a pure function of (rule, instant) — no hidden "today".

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

/// Wall-clock time applied to computed occurrences. Out-of-range values are
/// clamped at construction, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub kind: RecurrenceKind,
    /// Every N days/weeks/months. Clamped to >= 1 at construction.
    pub interval: u32,
    /// Weekly only. Kept sorted by days-from-Monday, deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    /// Instant the series was anchored at (first schedule point).
    pub anchor: DateTime<Utc>,
}

impl RecurrenceRule {
    pub fn daily(interval: u32, anchor: DateTime<Utc>) -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            interval: interval.max(1),
            weekdays: Vec::new(),
            time_of_day: None,
            anchor,
        }
    }

    pub fn weekly(interval: u32, weekdays: Vec<Weekday>, anchor: DateTime<Utc>) -> Self {
        let mut days = weekdays;
        days.sort_by_key(|w| w.num_days_from_monday());
        days.dedup();
        Self {
            kind: RecurrenceKind::Weekly,
            interval: interval.max(1),
            weekdays: days,
            time_of_day: None,
            anchor,
        }
    }

    pub fn monthly(interval: u32, anchor: DateTime<Utc>) -> Self {
        Self {
            kind: RecurrenceKind::Monthly,
            interval: interval.max(1),
            weekdays: Vec::new(),
            time_of_day: None,
            anchor,
        }
    }

    pub fn with_time_of_day(mut self, hour: u32, minute: u32) -> Self {
        self.time_of_day = Some(TimeOfDay::new(hour, minute));
        self
    }

    /// Structural check for rules arriving from storage or user input.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind == RecurrenceKind::Weekly && self.weekdays.is_empty() {
            return Err("weekly rule needs at least one weekday".to_string());
        }
        Ok(())
    }

    /// Compute the next occurrence strictly after `after`.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let next = match self.kind {
            RecurrenceKind::Daily => after + Duration::days(i64::from(self.interval)),
            RecurrenceKind::Weekly => self.next_weekly(after),
            RecurrenceKind::Monthly => after
                .checked_add_months(Months::new(self.interval))
                .unwrap_or(after),
        };
        self.apply_time_of_day(next)
    }

    fn next_weekly(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        // Invalid (empty) weekday sets must not panic here; fall back to
        // whole interval-weeks.
        if self.weekdays.is_empty() {
            return after + Duration::weeks(i64::from(self.interval));
        }

        let current = after.weekday().num_days_from_monday();
        let days_ahead = match self
            .weekdays
            .iter()
            .map(|w| w.num_days_from_monday())
            .find(|&d| d > current)
        {
            // Later weekday within the current week.
            Some(d) => i64::from(d - current),
            // Wrap to the first weekday, `interval` weeks on.
            None => {
                let first = self.weekdays[0].num_days_from_monday();
                i64::from(7 * self.interval - current + first)
            }
        };

        after + Duration::days(days_ahead)
    }

    fn apply_time_of_day(&self, dt: DateTime<Utc>) -> DateTime<Utc> {
        let Some(tod) = self.time_of_day else {
            return dt;
        };
        dt.with_hour(tod.hour)
            .and_then(|d| d.with_minute(tod.minute))
            .and_then(|d| d.with_second(0))
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(dt)
    }
}
