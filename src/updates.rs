//! Administrative record updates.
//!
//! Each change arrives as a form-shaped input, is validated and turned into
//! the exact column set written to the backend. The same patch can be applied
//! to an in-memory record so offline stores stay consistent with the backend.

use crate::models::{
    optional, Device, DeviceRequest, DeviceStatus, IssueReport, IssueStatus, RequestStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Edited device fields as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEdit {
    #[serde(default)]
    pub asset_number: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub status: DeviceStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "optional::blank_as_none")]
    pub assigned_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Columns written for a device edit.
///
/// `assigned_to` and `assigned_date` are always written so that leaving
/// the assigned status clears them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevicePatch {
    pub asset_number: String,
    pub serial_number: String,
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: DeviceStatus,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub assigned_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DeviceEdit {
    /// Validate the edit and build the patch as of `now`.
    ///
    /// An assignment without a date is dated today.
    pub fn into_patch(self, now: DateTime<Utc>) -> Result<DevicePatch, String> {
        let (Some(asset_number), Some(serial_number), Some(device_type)) = (
            filled(self.asset_number),
            filled(self.serial_number),
            filled(self.device_type),
        ) else {
            return Err("Asset Number, Serial Number, and Device Type are required".to_string());
        };

        let (assigned_to, assigned_date) = if self.status == DeviceStatus::Assigned {
            (
                filled(self.assigned_to),
                Some(self.assigned_date.unwrap_or_else(|| now.date_naive())),
            )
        } else {
            (None, None)
        };

        Ok(DevicePatch {
            asset_number,
            serial_number,
            device_type,
            brand: filled(self.brand),
            model: filled(self.model),
            status: self.status,
            notes: filled(self.notes),
            assigned_to,
            assigned_date,
            updated_at: now,
        })
    }
}

impl DevicePatch {
    pub fn apply(&self, device: &mut Device) {
        device.asset_number = Some(self.asset_number.clone());
        device.serial_number = Some(self.serial_number.clone());
        device.device_type = Some(self.device_type.clone());
        device.brand = self.brand.clone();
        device.model = self.model.clone();
        device.status = self.status.clone();
        device.notes = self.notes.clone();
        device.assigned_to = self.assigned_to.clone();
        device.assigned_date = self
            .assigned_date
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());
        device.updated_at = Some(self.updated_at);
    }
}

/// Outcome of reviewing a device request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for RequestStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => RequestStatus::Approved,
            ReviewDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestReview {
    pub status: ReviewDecision,
    #[serde(default)]
    pub admin_notes: Option<String>,
    /// Email of the reviewing administrator.
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestReviewPatch {
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

impl RequestReview {
    pub fn into_patch(self, now: DateTime<Utc>) -> RequestReviewPatch {
        RequestReviewPatch {
            status: self.status.into(),
            admin_notes: filled(self.admin_notes),
            reviewed_by: filled(self.reviewed_by),
            reviewed_at: now,
        }
    }
}

impl RequestReviewPatch {
    pub fn apply(&self, request: &mut DeviceRequest) {
        request.status = self.status.clone();
        request.admin_notes = self.admin_notes.clone();
        request.reviewed_by = self.reviewed_by.clone();
        request.reviewed_at = Some(self.reviewed_at);
    }
}

/// New status for an issue report, with notes when resolving.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueUpdate {
    pub status: IssueStatus,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

/// Columns written for an issue status change.
///
/// Resolution fields are only written when the issue is resolved; any other
/// status leaves earlier resolution data untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuePatch {
    pub status: IssueStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl IssueUpdate {
    pub fn into_patch(self, now: DateTime<Utc>) -> Result<IssuePatch, String> {
        if let IssueStatus::Other(ref status) = self.status {
            return Err(format!("Unknown issue status: {}", status));
        }

        let resolved = self.status == IssueStatus::Resolved;
        Ok(IssuePatch {
            resolution_notes: if resolved {
                filled(self.resolution_notes)
            } else {
                None
            },
            resolved_at: resolved.then_some(now),
            status: self.status,
            updated_at: now,
        })
    }
}

impl IssuePatch {
    pub fn apply(&self, issue: &mut IssueReport) {
        issue.status = self.status.clone();
        issue.updated_at = Some(self.updated_at);
        if let Some(ref notes) = self.resolution_notes {
            issue.resolution_notes = Some(notes.clone());
        }
        if let Some(at) = self.resolved_at {
            issue.resolved_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::{create_test_device, fixed_now};
    use serde_json::json;

    fn edit(value: serde_json::Value) -> DeviceEdit {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_assignment_defaults_date_to_today() {
        let patch = edit(json!({
            "asset_number": "IT-9",
            "serial_number": "SN-9",
            "device_type": "Laptop",
            "status": "assigned",
            "assigned_to": "a@x.com",
            "assigned_date": ""
        }))
        .into_patch(fixed_now())
        .unwrap();

        assert_eq!(patch.assigned_to.as_deref(), Some("a@x.com"));
        assert_eq!(patch.assigned_date, NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(patch.updated_at, fixed_now());
    }

    #[test]
    fn test_leaving_assigned_clears_assignment() {
        let patch = edit(json!({
            "asset_number": "IT-1",
            "serial_number": "SN-1",
            "device_type": "Laptop",
            "brand": "",
            "status": "available",
            "assigned_to": "a@x.com",
            "assigned_date": "2026-03-02"
        }))
        .into_patch(fixed_now())
        .unwrap();

        assert!(patch.assigned_to.is_none());
        assert!(patch.assigned_date.is_none());
        assert!(patch.brand.is_none());

        // cleared columns are sent as explicit nulls
        let body = serde_json::to_value(&patch).unwrap();
        assert!(body["assigned_to"].is_null());
        assert!(body.get("assigned_date").is_some());
        assert_eq!(body["status"], "available");

        let mut device = Device {
            assigned_to: Some("a@x.com".to_string()),
            assigned_date: Some(fixed_now()),
            ..create_test_device("1", "assigned")
        };
        patch.apply(&mut device);
        assert_eq!(device.status, DeviceStatus::Available);
        assert!(device.assignee().is_none());
        assert!(device.assigned_date.is_none());
        assert_eq!(device.updated_at, Some(fixed_now()));
    }

    #[test]
    fn test_device_edit_requires_identity_fields() {
        let err = edit(json!({
            "asset_number": "IT-1",
            "serial_number": "  ",
            "device_type": "Laptop",
            "status": "available"
        }))
        .into_patch(fixed_now())
        .unwrap_err();
        assert_eq!(err, "Asset Number, Serial Number, and Device Type are required");
    }

    #[test]
    fn test_request_review() {
        let review: RequestReview = serde_json::from_value(json!({
            "status": "rejected",
            "admin_notes": "",
            "reviewed_by": "admin@x.com"
        }))
        .unwrap();
        let patch = review.into_patch(fixed_now());

        assert_eq!(patch.status, RequestStatus::Rejected);
        assert!(patch.admin_notes.is_none());
        assert_eq!(patch.reviewed_at, fixed_now());

        let pending = serde_json::from_value::<RequestReview>(json!({"status": "pending"}));
        assert!(pending.is_err());
    }

    fn issue(status: &str) -> IssueReport {
        serde_json::from_value(json!({
            "id": "i1",
            "severity": "high",
            "status": status,
            "resolution_notes": "old notes"
        }))
        .unwrap()
    }

    #[test]
    fn test_resolving_issue_stamps_resolution() {
        let update: IssueUpdate = serde_json::from_value(json!({
            "status": "resolved",
            "resolution_notes": "Replaced the cable"
        }))
        .unwrap();
        let patch = update.into_patch(fixed_now()).unwrap();
        assert_eq!(patch.resolved_at, Some(fixed_now()));

        let mut report = issue("in_progress");
        patch.apply(&mut report);
        assert_eq!(report.status, IssueStatus::Resolved);
        assert_eq!(report.resolution_notes.as_deref(), Some("Replaced the cable"));
        assert_eq!(report.resolved_at, Some(fixed_now()));
    }

    #[test]
    fn test_other_status_leaves_resolution_untouched() {
        let update: IssueUpdate = serde_json::from_value(json!({
            "status": "in_progress",
            "resolution_notes": "ignored"
        }))
        .unwrap();
        let patch = update.into_patch(fixed_now()).unwrap();

        let body = serde_json::to_value(&patch).unwrap();
        assert!(body.get("resolution_notes").is_none());
        assert!(body.get("resolved_at").is_none());
        assert!(body.get("updated_at").is_some());

        let mut report = issue("pending");
        patch.apply(&mut report);
        assert_eq!(report.resolution_notes.as_deref(), Some("old notes"));
        assert!(report.resolved_at.is_none());
        assert_eq!(report.updated_at, Some(fixed_now()));
    }

    #[test]
    fn test_unknown_issue_status_rejected() {
        let update: IssueUpdate = serde_json::from_value(json!({"status": "archived"})).unwrap();
        assert_eq!(
            update.into_patch(fixed_now()).unwrap_err(),
            "Unknown issue status: archived"
        );
    }
}
