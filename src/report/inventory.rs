//! Inventory reports.
//!
//! Each report filters the full device list and projects it to table rows.
//! Rows are typed per report and flattened into a column/row table for
//! rendering.

use crate::models::{optional, Device, DeviceStatus};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Operations,
    AssetsUsers,
    UserDevices,
    Stock,
    Warranty,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Operations,
        ReportKind::AssetsUsers,
        ReportKind::UserDevices,
        ReportKind::Stock,
        ReportKind::Warranty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Operations => "operations",
            ReportKind::AssetsUsers => "assets-users",
            ReportKind::UserDevices => "user-devices",
            ReportKind::Stock => "stock",
            ReportKind::Warranty => "warranty",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Optional narrowing applied by some reports.
///
/// Blank query values (`?from=&to=`) mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    /// Operations report: earliest creation date, inclusive.
    #[serde(default, deserialize_with = "optional::blank_as_none")]
    pub from: Option<NaiveDate>,
    /// Operations report: latest creation date, inclusive.
    #[serde(default, deserialize_with = "optional::blank_as_none")]
    pub to: Option<NaiveDate>,
    /// User-devices report: the assignee to list.
    #[serde(default, deserialize_with = "optional::blank_as_none")]
    pub user: Option<String>,
}

/// A rendered report table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A typed report row that knows its column layout.
pub trait ReportRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn table<R: ReportRow>(rows: &[R]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns = R::HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = rows.iter().map(R::cells).collect();
    (columns, rows)
}

fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRow {
    pub asset_number: String,
    pub operation: String,
    pub user: String,
    pub date: String,
    pub device_type: String,
}

impl ReportRow for OperationRow {
    const HEADERS: &'static [&'static str] =
        &["Asset Number", "Operation", "User", "Date", "Device Type"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_number.clone(),
            self.operation.clone(),
            self.user.clone(),
            self.date.clone(),
            self.device_type.clone(),
        ]
    }
}

fn operation_label(status: &DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Assigned => "Delivered",
        DeviceStatus::Available => "Available",
        _ => "Not Working",
    }
}

/// Every device, optionally restricted to a creation-date range.
pub fn operations_rows(devices: &[Device], filter: &ReportFilter) -> Vec<OperationRow> {
    devices
        .iter()
        .filter(|d| {
            let created = d.created_at.date_naive();
            filter.from.map_or(true, |from| created >= from)
                && filter.to.map_or(true, |to| created <= to)
        })
        .map(|d| OperationRow {
            asset_number: text(&d.asset_number),
            operation: operation_label(&d.status).to_string(),
            user: d.assignee().unwrap_or("N/A").to_string(),
            date: format_date(d.assigned_date.or(Some(d.created_at))),
            device_type: text(&d.device_type),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetUserRow {
    pub asset_number: String,
    pub user_name: String,
    pub device_type: String,
    pub brand_model: String,
    pub delivery_date: String,
}

impl ReportRow for AssetUserRow {
    const HEADERS: &'static [&'static str] = &[
        "Asset Number",
        "User Name",
        "Device Type",
        "Brand/Model",
        "Delivery Date",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_number.clone(),
            self.user_name.clone(),
            self.device_type.clone(),
            self.brand_model.clone(),
            self.delivery_date.clone(),
        ]
    }
}

/// Assigned devices that have an assignee.
pub fn assets_with_users_rows(devices: &[Device]) -> Vec<AssetUserRow> {
    devices
        .iter()
        .filter(|d| d.status == DeviceStatus::Assigned)
        .filter_map(|d| {
            d.assignee().map(|user| AssetUserRow {
                asset_number: text(&d.asset_number),
                user_name: user.to_string(),
                device_type: text(&d.device_type),
                brand_model: d.brand_model(),
                delivery_date: format_date(d.assigned_date),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDeviceRow {
    pub asset_number: String,
    pub device_type: String,
    pub brand_model: String,
    pub serial_number: String,
    pub assigned_date: String,
    pub status: String,
}

impl ReportRow for UserDeviceRow {
    const HEADERS: &'static [&'static str] = &[
        "Asset Number",
        "Device Type",
        "Brand/Model",
        "Serial Number",
        "Assigned Date",
        "Status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_number.clone(),
            self.device_type.clone(),
            self.brand_model.clone(),
            self.serial_number.clone(),
            self.assigned_date.clone(),
            self.status.clone(),
        ]
    }
}

/// Devices held by one user. Empty when no user is selected.
pub fn devices_by_user_rows(devices: &[Device], user: Option<&str>) -> Vec<UserDeviceRow> {
    let Some(user) = user.filter(|u| !u.trim().is_empty()) else {
        return Vec::new();
    };

    devices
        .iter()
        .filter(|d| d.assigned_to.as_deref() == Some(user))
        .map(|d| UserDeviceRow {
            asset_number: text(&d.asset_number),
            device_type: text(&d.device_type),
            brand_model: d.brand_model(),
            serial_number: text(&d.serial_number),
            assigned_date: format_date(d.assigned_date),
            status: d.status.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRow {
    pub asset_number: String,
    pub device_type: String,
    pub brand_model: String,
    pub serial_number: String,
    pub status: String,
    pub purchase_date: String,
}

impl ReportRow for StockRow {
    const HEADERS: &'static [&'static str] = &[
        "Asset Number",
        "Device Type",
        "Brand/Model",
        "Serial Number",
        "Status",
        "Purchase Date",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_number.clone(),
            self.device_type.clone(),
            self.brand_model.clone(),
            self.serial_number.clone(),
            self.status.clone(),
            self.purchase_date.clone(),
        ]
    }
}

/// Devices that are available or have nobody assigned.
pub fn stock_rows(devices: &[Device]) -> Vec<StockRow> {
    devices
        .iter()
        .filter(|d| d.status == DeviceStatus::Available || d.assignee().is_none())
        .map(|d| StockRow {
            asset_number: text(&d.asset_number),
            device_type: text(&d.device_type),
            brand_model: d.brand_model(),
            serial_number: text(&d.serial_number),
            status: d.status.to_string(),
            purchase_date: format_date(d.purchase_date),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarrantyRow {
    pub asset_number: String,
    pub device_type: String,
    pub brand_model: String,
    pub purchase_date: String,
    pub warranty_status: String,
    pub assigned_to: String,
}

impl ReportRow for WarrantyRow {
    const HEADERS: &'static [&'static str] = &[
        "Asset Number",
        "Device Type",
        "Brand/Model",
        "Purchase Date",
        "Warranty Status",
        "Assigned To",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_number.clone(),
            self.device_type.clone(),
            self.brand_model.clone(),
            self.purchase_date.clone(),
            self.warranty_status.clone(),
            self.assigned_to.clone(),
        ]
    }
}

/// Whether a purchase made at `purchased` is still covered at `now`.
pub fn in_warranty(purchased: Option<DateTime<Utc>>, now: DateTime<Utc>, years: u32) -> bool {
    let cutoff = now
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    purchased.is_some_and(|at| at > cutoff)
}

/// Warranty coverage for every device.
pub fn warranty_rows(devices: &[Device], now: DateTime<Utc>, years: u32) -> Vec<WarrantyRow> {
    devices
        .iter()
        .map(|d| WarrantyRow {
            asset_number: text(&d.asset_number),
            device_type: text(&d.device_type),
            brand_model: d.brand_model(),
            purchase_date: format_date(d.purchase_date),
            warranty_status: if in_warranty(d.purchase_date, now, years) {
                "In Warranty".to_string()
            } else {
                "Out of Warranty".to_string()
            },
            assigned_to: d.assignee().unwrap_or("Not Assigned").to_string(),
        })
        .collect()
}

/// Build a report of the given kind.
///
/// Rows are listed newest device first.
pub fn build_report(
    kind: ReportKind,
    devices: &[Device],
    filter: &ReportFilter,
    now: DateTime<Utc>,
    warranty_years: u32,
) -> InventoryReport {
    let mut newest_first = devices.to_vec();
    newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let devices = newest_first.as_slice();

    let (title, (columns, rows)) = match kind {
        ReportKind::Operations => (
            "Operations Report".to_string(),
            table(&operations_rows(devices, filter)),
        ),
        ReportKind::AssetsUsers => (
            "Assets with Users Report".to_string(),
            table(&assets_with_users_rows(devices)),
        ),
        ReportKind::UserDevices => (
            format!(
                "Devices for User: {}",
                filter.user.as_deref().unwrap_or_default()
            ),
            table(&devices_by_user_rows(devices, filter.user.as_deref())),
        ),
        ReportKind::Stock => (
            "Devices in Stock Report".to_string(),
            table(&stock_rows(devices)),
        ),
        ReportKind::Warranty => (
            "Warranty Status Report".to_string(),
            table(&warranty_rows(devices, now, warranty_years)),
        ),
    };

    InventoryReport {
        kind,
        title,
        generated_at: now,
        columns,
        rows,
    }
}
