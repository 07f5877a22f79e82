//! Inventory analytics aggregation.
//!
//! This module reduces a complete list of device records to the dashboard
//! summary and its chart series. Everything here is pure: the caller supplies
//! the records and the instant the analytics are computed "as of".

use super::timeline::{MonthWindow, YearMonth};
use crate::models::{
    Analytics, AnalyticsCharts, AnalyticsSummary, Device, DeviceStatus, MonthCount, NamedCount,
};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;

pub const TOP_DEVICE_TYPES: usize = 8;
pub const TOP_BRANDS: usize = 6;
pub const TOP_USERS: usize = 5;
pub const TIMELINE_MONTHS: usize = 6;
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Group counts that remember the order in which keys were first seen.
///
/// Ties in top-N selections resolve to first-seen order, so the ordering has
/// to be tracked explicitly rather than left to a hash map.
#[derive(Debug, Default)]
pub struct Tally {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// All groups in first-seen order.
    pub fn into_named(self) -> Vec<NamedCount> {
        self.entries
            .into_iter()
            .map(|(name, value)| NamedCount { name, value })
            .collect()
    }

    /// The `n` largest groups, highest count first.
    pub fn top(mut self, n: usize) -> Vec<NamedCount> {
        // sort_by_key is stable: equal counts keep first-seen order
        self.entries.sort_by_key(|(_, count)| Reverse(*count));
        self.entries.truncate(n);
        self.into_named()
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

/// Count devices per status literal, in first-seen order.
pub fn status_distribution(devices: &[Device]) -> Vec<NamedCount> {
    devices
        .iter()
        .map(|d| d.status.as_str())
        .collect::<Tally>()
        .into_named()
}

/// The most common device types.
pub fn device_type_distribution(devices: &[Device]) -> Vec<NamedCount> {
    devices
        .iter()
        .map(Device::device_type_or_unknown)
        .collect::<Tally>()
        .top(TOP_DEVICE_TYPES)
}

/// The most common brands.
pub fn top_brands(devices: &[Device]) -> Vec<NamedCount> {
    devices
        .iter()
        .map(Device::brand_or_unknown)
        .collect::<Tally>()
        .top(TOP_BRANDS)
}

/// Users holding the most assigned devices.
///
/// Assigned devices without an assignee are skipped.
pub fn top_users(devices: &[Device]) -> Vec<NamedCount> {
    devices
        .iter()
        .filter(|d| d.status == DeviceStatus::Assigned)
        .filter_map(Device::assignee)
        .collect::<Tally>()
        .top(TOP_USERS)
}

/// Purchases per month over the trailing window.
pub fn purchase_timeline(devices: &[Device], now: DateTime<Utc>) -> Vec<MonthCount> {
    MonthWindow::trailing(now, TIMELINE_MONTHS)
        .record_all(devices.iter().map(|d| d.purchase_date))
        .into_counts()
}

/// Assignments per month over the trailing window.
pub fn assignment_timeline(devices: &[Device], now: DateTime<Utc>) -> Vec<MonthCount> {
    MonthWindow::trailing(now, TIMELINE_MONTHS)
        .record_all(devices.iter().map(|d| d.assigned_date))
        .into_counts()
}

/// Percentage of `part` in `total`, rounded half up. Zero when `total` is 0.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Compute the scalar dashboard figures.
pub fn summarize(devices: &[Device], now: DateTime<Utc>) -> AnalyticsSummary {
    let this_month = YearMonth::of(now);
    let last_month = this_month.previous();
    let recent_cutoff = now - Duration::hours(24 * RECENT_WINDOW_DAYS);

    let count_status = |status: DeviceStatus| devices.iter().filter(|d| d.status == status).count();

    let total_devices = devices.len();
    let assigned_devices = count_status(DeviceStatus::Assigned);

    AnalyticsSummary {
        total_devices,
        assigned_devices,
        available_devices: count_status(DeviceStatus::Available),
        not_working_devices: count_status(DeviceStatus::NotWorking),
        devices_added_this_month: devices
            .iter()
            .filter(|d| YearMonth::of(d.created_at) == this_month)
            .count(),
        devices_added_last_month: devices
            .iter()
            .filter(|d| YearMonth::of(d.created_at) == last_month)
            .count(),
        assignment_rate: percentage(assigned_devices, total_devices),
        recent_activity_count: devices
            .iter()
            .filter(|d| d.created_at >= recent_cutoff)
            .count(),
        recent_assignments: devices
            .iter()
            .filter_map(|d| d.assigned_date)
            .filter(|at| *at >= recent_cutoff)
            .count(),
    }
}

/// Compute the full analytics document as of `now`.
pub fn compute_analytics(devices: &[Device], now: DateTime<Utc>) -> Analytics {
    Analytics {
        summary: summarize(devices, now),
        charts: AnalyticsCharts {
            status_distribution: status_distribution(devices),
            device_type_distribution: device_type_distribution(devices),
            top_brands: top_brands(devices),
            purchase_timeline: purchase_timeline(devices, now),
            assignment_timeline: assignment_timeline(devices, now),
            top_users: top_users(devices),
        },
    }
}
