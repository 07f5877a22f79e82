//! Calendar-month bucketing.
//!
//! Months are grouped by a locale-independent `(year, month)` key; the
//! "Oct 2026" label only appears when a [`YearMonth`] is displayed or
//! serialized.

use crate::models::MonthCount;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// The month containing `at`.
    pub fn of(at: DateTime<Utc>) -> Self {
        Self::new(at.year(), at.month())
    }

    /// The month `delta` months away (negative for the past).
    pub fn shift(self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }

    fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_day() {
            Some(day) => write!(f, "{}", day.format("%b %Y")),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A run of consecutive months, each seeded with a zero count.
#[derive(Debug, Clone)]
pub struct MonthWindow {
    buckets: Vec<MonthCount>,
}

impl MonthWindow {
    /// The trailing `months` calendar months ending with the month of `now`,
    /// oldest first.
    pub fn trailing(now: DateTime<Utc>, months: usize) -> Self {
        let current = YearMonth::of(now);
        let buckets = (0..months as i32)
            .rev()
            .map(|back| MonthCount {
                month: current.shift(-back),
                count: 0,
            })
            .collect();

        Self { buckets }
    }

    /// Count `at` if it falls in one of the window's months. Returns whether
    /// it was counted.
    pub fn record(&mut self, at: DateTime<Utc>) -> bool {
        let key = YearMonth::of(at);
        match self.buckets.iter_mut().find(|b| b.month == key) {
            Some(bucket) => {
                bucket.count += 1;
                true
            }
            None => false,
        }
    }

    /// Count every present timestamp of the iterator.
    pub fn record_all<I>(mut self, stamps: I) -> Self
    where
        I: IntoIterator<Item = Option<DateTime<Utc>>>,
    {
        for at in stamps.into_iter().flatten() {
            self.record(at);
        }
        self
    }

    pub fn into_counts(self) -> Vec<MonthCount> {
        self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_shift_across_years() {
        let jan = YearMonth::new(2026, 1);
        assert_eq!(jan.previous(), YearMonth::new(2025, 12));
        assert_eq!(jan.shift(-13), YearMonth::new(2024, 12));
        assert_eq!(YearMonth::new(2025, 12).shift(1), jan);
    }

    #[test]
    fn test_label() {
        assert_eq!(YearMonth::new(2026, 10).to_string(), "Oct 2026");
        assert_eq!(
            serde_json::to_value(YearMonth::new(2025, 5)).unwrap(),
            serde_json::json!("May 2025")
        );
    }

    #[test]
    fn test_trailing_window_order() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap();
        let months: Vec<String> = MonthWindow::trailing(now, 6)
            .into_counts()
            .into_iter()
            .map(|b| b.month.to_string())
            .collect();

        assert_eq!(
            months,
            vec!["Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]
        );
    }

    #[test]
    fn test_record_outside_window() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut window = MonthWindow::trailing(now, 6);

        assert!(window.record(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()));
        assert!(!window.record(Utc.with_ymd_and_hms(2026, 4, 30, 23, 59, 59).unwrap()));
        assert!(!window.record(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()));

        let counts = window.into_counts();
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts.iter().map(|b| b.count).sum::<usize>(), 1);
    }
}
