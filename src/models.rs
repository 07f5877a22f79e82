//! Data models for the inventory service.
//!
//! Records arrive from the record store as loosely-shaped JSON rows; the
//! types here pin them down at deserialization time so the analysis code can
//! rely on well-typed input.

use crate::analysis::timeline::YearMonth;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a device.
///
/// Unknown literals are preserved so they show up unchanged in the status
/// distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Assigned,
    Available,
    NotWorking,
    Other(String),
}

impl DeviceStatus {
    /// The literal stored in the backend.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Assigned => "assigned",
            DeviceStatus::Available => "available",
            DeviceStatus::NotWorking => "not_working",
            DeviceStatus::Other(s) => s,
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "assigned" => DeviceStatus::Assigned,
            "available" => DeviceStatus::Available,
            "not_working" => DeviceStatus::NotWorking,
            _ => DeviceStatus::Other(s),
        }
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked physical asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Opaque unique identifier.
    pub id: String,
    /// Inventory tag printed on the asset.
    #[serde(default)]
    pub asset_number: Option<String>,
    /// Manufacturer serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Free-text category such as "Laptop".
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub status: DeviceStatus,
    /// Email of the user holding the device.
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub assigned_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize_required")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Device type with blanks normalized to "Unknown".
    pub fn device_type_or_unknown(&self) -> &str {
        non_blank(self.device_type.as_deref()).unwrap_or("Unknown")
    }

    /// Brand with blanks normalized to "Unknown".
    pub fn brand_or_unknown(&self) -> &str {
        non_blank(self.brand.as_deref()).unwrap_or("Unknown")
    }

    /// Assignee, if one is recorded.
    pub fn assignee(&self) -> Option<&str> {
        non_blank(self.assigned_to.as_deref())
    }

    /// "{brand} {model}" trimmed, or "N/A" when both are missing.
    pub fn brand_model(&self) -> String {
        let joined = format!(
            "{} {}",
            self.brand.as_deref().unwrap_or(""),
            self.model.as_deref().unwrap_or("")
        );
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            "N/A".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Review status of a device request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl From<String> for RequestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => RequestStatus::Pending,
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Other(s),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => "pending".to_string(),
            RequestStatus::Approved => "approved".to_string(),
            RequestStatus::Rejected => "rejected".to_string(),
            RequestStatus::Other(s) => s,
        }
    }
}

/// A user's request for a new device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub id: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Progress of a reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
    Other(String),
}

impl From<String> for IssueStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => IssueStatus::Pending,
            "in_progress" => IssueStatus::InProgress,
            "resolved" => IssueStatus::Resolved,
            "closed" => IssueStatus::Closed,
            _ => IssueStatus::Other(s),
        }
    }
}

impl From<IssueStatus> for String {
    fn from(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Pending => "pending".to_string(),
            IssueStatus::InProgress => "in_progress".to_string(),
            IssueStatus::Resolved => "resolved".to_string(),
            IssueStatus::Closed => "closed".to_string(),
            IssueStatus::Other(s) => s,
        }
    }
}

/// Severity a user attached to an issue report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl From<String> for IssueSeverity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => IssueSeverity::Low,
            "medium" => IssueSeverity::Medium,
            "high" => IssueSeverity::High,
            "critical" => IssueSeverity::Critical,
            _ => IssueSeverity::Other(s),
        }
    }
}

impl From<IssueSeverity> for String {
    fn from(severity: IssueSeverity) -> Self {
        match severity {
            IssueSeverity::Low => "low".to_string(),
            IssueSeverity::Medium => "medium".to_string(),
            IssueSeverity::High => "high".to_string(),
            IssueSeverity::Critical => "critical".to_string(),
            IssueSeverity::Other(s) => s,
        }
    }
}

/// A problem reported against a device or service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueReport {
    pub id: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub title: Option<String>,
    pub status: IssueStatus,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An account from the backend's auth directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// One `{name, value}` entry of a categorical chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub value: usize,
}

/// One `{month, count}` entry of a timeline chart.
///
/// The month serializes as its display label (e.g. "Oct 2026").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub count: usize,
}

/// Scalar dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_devices: usize,
    pub assigned_devices: usize,
    pub available_devices: usize,
    pub not_working_devices: usize,
    pub devices_added_this_month: usize,
    pub devices_added_last_month: usize,
    /// Percentage of devices assigned, rounded to the nearest integer.
    pub assignment_rate: u32,
    pub recent_activity_count: usize,
    pub recent_assignments: usize,
}

/// Chart-ready series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsCharts {
    pub status_distribution: Vec<NamedCount>,
    pub device_type_distribution: Vec<NamedCount>,
    pub top_brands: Vec<NamedCount>,
    pub purchase_timeline: Vec<MonthCount>,
    pub assignment_timeline: Vec<MonthCount>,
    pub top_users: Vec<NamedCount>,
}

/// The complete analytics document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub summary: AnalyticsSummary,
    pub charts: AnalyticsCharts,
}

/// Form and query values where an empty string means "not set".
pub mod optional {
    use serde::{de, Deserialize, Deserializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

/// Lenient timestamp parsing for backend rows.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    /// Parse an RFC 3339 timestamp, a naive date-time (taken as UTC) or a
    /// plain date (midnight UTC).
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        // Postgres text output: "2026-10-18 09:30:00.123+00"
        for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
            if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }

    pub fn deserialize_required<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_optional(deserializer)?
            .ok_or_else(|| de::Error::custom("missing required timestamp"))
    }
}
