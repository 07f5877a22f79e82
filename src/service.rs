//! Inventory service.
//!
//! Ties a record store to the pure analysis and report code. Every
//! operation fetches what it needs once and computes over that copy; a
//! failed fetch aborts the operation with no partial result.

use crate::analysis::{compute_analytics, IssueStats, RequestStats};
use crate::config::ReportsConfig;
use crate::models::{Analytics, AuthUser, Device, DeviceRequest, IssueReport};
use crate::notify::{Notification, NotificationRequest};
use crate::report::{build_report, InventoryReport, ReportFilter, ReportKind};
use crate::store::{RecordStore, StoreError};
use crate::updates::{DeviceEdit, IssueUpdate, RequestReview};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

/// Failures surfaced to callers of the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("analytics unavailable: {0}")]
    AnalyticsUnavailable(String),

    #[error("report unavailable: {0}")]
    ReportUnavailable(String),

    #[error("statistics unavailable: {0}")]
    StatsUnavailable(String),

    #[error("notification failed: {0}")]
    NotificationFailed(String),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("{0}")]
    NotFound(String),

    #[error("users unavailable: {0}")]
    UsersUnavailable(String),

    #[error("{0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// Short label for error documents.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceError::AnalyticsUnavailable(_) => "Failed to fetch analytics",
            ServiceError::ReportUnavailable(_) => "Failed to generate report",
            ServiceError::StatsUnavailable(_) => "Failed to fetch statistics",
            ServiceError::NotificationFailed(_) => "Failed to send notification",
            ServiceError::UpdateFailed(_) => "Failed to update record",
            ServiceError::NotFound(_) => "Record not found",
            ServiceError::UsersUnavailable(_) => "Failed to fetch users",
            ServiceError::InvalidRequest(_) => "Invalid request",
        }
    }

    /// The underlying failure message.
    pub fn details(&self) -> &str {
        match self {
            ServiceError::AnalyticsUnavailable(msg)
            | ServiceError::ReportUnavailable(msg)
            | ServiceError::StatsUnavailable(msg)
            | ServiceError::NotificationFailed(msg)
            | ServiceError::UpdateFailed(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::UsersUnavailable(msg)
            | ServiceError::InvalidRequest(msg) => msg,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

fn update_error(e: StoreError) -> ServiceError {
    error!("Error updating record: {}", e);
    match e {
        StoreError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
        _ => ServiceError::UpdateFailed(e.to_string()),
    }
}

/// Inventory operations over a record store.
pub struct InventoryService<S> {
    store: S,
    reports: ReportsConfig,
}

impl<S: RecordStore> InventoryService<S> {
    pub fn new(store: S, reports: ReportsConfig) -> Self {
        Self { store, reports }
    }

    /// Compute the analytics document as of `now`.
    pub async fn analytics(&self, now: DateTime<Utc>) -> ServiceResult<Analytics> {
        let devices = self.store.fetch_devices().await.map_err(|e| {
            error!("Error fetching devices for analytics: {}", e);
            ServiceError::AnalyticsUnavailable(e.to_string())
        })?;

        debug!("Aggregating {} devices", devices.len());
        Ok(compute_analytics(&devices, now))
    }

    /// Build an inventory report as of `now`.
    pub async fn report(
        &self,
        kind: ReportKind,
        filter: &ReportFilter,
        now: DateTime<Utc>,
    ) -> ServiceResult<InventoryReport> {
        let devices = self.store.fetch_devices().await.map_err(|e| {
            error!("Error fetching devices for {} report: {}", kind, e);
            ServiceError::ReportUnavailable(e.to_string())
        })?;

        let report = build_report(kind, &devices, filter, now, self.reports.warranty_years);
        debug!("{} report has {} rows", kind, report.rows.len());
        Ok(report)
    }

    pub async fn request_stats(&self) -> ServiceResult<RequestStats> {
        let requests = self.store.fetch_device_requests().await.map_err(|e| {
            error!("Error fetching device requests: {}", e);
            ServiceError::StatsUnavailable(e.to_string())
        })?;

        Ok(RequestStats::from_requests(&requests))
    }

    pub async fn issue_stats(&self) -> ServiceResult<IssueStats> {
        let issues = self.store.fetch_issue_reports().await.map_err(|e| {
            error!("Error fetching issue reports: {}", e);
            ServiceError::StatsUnavailable(e.to_string())
        })?;

        Ok(IssueStats::from_issues(&issues))
    }

    /// Record an in-app notification telling a user a device was assigned.
    pub async fn notify_assignment(
        &self,
        request: NotificationRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Notification> {
        let row = request
            .into_notification(now)
            .ok_or_else(|| ServiceError::InvalidRequest("Missing required fields".to_string()))?;

        let stored = self.store.insert_notification(&row).await.map_err(|e| {
            error!("Error creating notification: {}", e);
            ServiceError::NotificationFailed(e.to_string())
        })?;

        info!("Notified {} of device assignment", stored.user_email);
        Ok(stored)
    }

    /// Apply an administrator's edit to a device.
    ///
    /// Assignment fields are set only while the device is assigned.
    pub async fn update_device(
        &self,
        id: &str,
        edit: DeviceEdit,
        now: DateTime<Utc>,
    ) -> ServiceResult<Device> {
        let patch = edit.into_patch(now).map_err(ServiceError::InvalidRequest)?;
        let device = self
            .store
            .update_device(id, &patch)
            .await
            .map_err(update_error)?;

        info!("Updated device {} ({})", id, device.status);
        Ok(device)
    }

    /// Approve or reject a device request.
    pub async fn review_request(
        &self,
        id: &str,
        review: RequestReview,
        now: DateTime<Utc>,
    ) -> ServiceResult<DeviceRequest> {
        let patch = review.into_patch(now);
        let request = self
            .store
            .review_device_request(id, &patch)
            .await
            .map_err(update_error)?;

        info!("Reviewed device request {}", id);
        Ok(request)
    }

    /// Move an issue report to a new status.
    pub async fn update_issue(
        &self,
        id: &str,
        update: IssueUpdate,
        now: DateTime<Utc>,
    ) -> ServiceResult<IssueReport> {
        let patch = update.into_patch(now).map_err(ServiceError::InvalidRequest)?;
        let issue = self
            .store
            .update_issue_report(id, &patch)
            .await
            .map_err(update_error)?;

        info!("Updated issue report {}", id);
        Ok(issue)
    }

    pub async fn users(&self) -> ServiceResult<Vec<AuthUser>> {
        self.store.list_users().await.map_err(|e| {
            error!("Error fetching users: {}", e);
            ServiceError::UsersUnavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::{create_test_device, fixed_now};
    use crate::models::Device;
    use crate::notify::DeviceInfo;
    use crate::store::{MockRecordStore, Snapshot, SnapshotStore, StoreError};

    fn service_with(store: MockRecordStore) -> InventoryService<MockRecordStore> {
        InventoryService::new(store, ReportsConfig::default())
    }

    #[tokio::test]
    async fn test_analytics_from_store() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_devices().times(1).returning(|| {
            Ok(vec![
                Device {
                    assigned_to: Some("a@x.com".to_string()),
                    ..create_test_device("1", "assigned")
                },
                create_test_device("2", "available"),
            ])
        });

        let analytics = service_with(store).analytics(fixed_now()).await.unwrap();
        assert_eq!(analytics.summary.total_devices, 2);
        assert_eq!(analytics.summary.assignment_rate, 50);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_all_or_nothing() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_devices().returning(|| {
            Err(StoreError::Status {
                status: 503,
                body: "upstream down".to_string(),
            })
        });

        let err = service_with(store)
            .analytics(fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AnalyticsUnavailable(_)));
        assert_eq!(err.label(), "Failed to fetch analytics");
        assert!(err.details().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_report_uses_configured_warranty() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_devices().returning(|| {
            Ok(vec![Device {
                purchase_date: Some(fixed_now() - chrono::Months::new(30)),
                ..create_test_device("1", "available")
            }])
        });

        let service = InventoryService::new(store, ReportsConfig { warranty_years: 2 });
        let report = service
            .report(ReportKind::Warranty, &ReportFilter::default(), fixed_now())
            .await
            .unwrap();
        assert_eq!(report.rows[0][4], "Out of Warranty");
    }

    #[tokio::test]
    async fn test_stats_failure() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_issue_reports().returning(|| {
            Err(StoreError::Timeout(30))
        });

        let err = service_with(store).issue_stats().await.unwrap_err();
        assert!(matches!(err, ServiceError::StatsUnavailable(_)));
        assert_eq!(err.details(), "request timed out after 30s");
    }

    #[tokio::test]
    async fn test_notify_assignment_validates_before_insert() {
        let mut store = MockRecordStore::new();
        store.expect_insert_notification().never();

        let err = service_with(store)
            .notify_assignment(NotificationRequest::default(), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert_eq!(err.details(), "Missing required fields");
    }

    #[tokio::test]
    async fn test_notify_assignment_with_snapshot_store() {
        let service = InventoryService::new(
            SnapshotStore::new(Snapshot::default()),
            ReportsConfig::default(),
        );

        let request = NotificationRequest {
            user_email: Some("a@x.com".to_string()),
            device_info: Some(DeviceInfo {
                id: Some("d1".to_string()),
                ..DeviceInfo::default()
            }),
        };

        let stored = service
            .notify_assignment(request, fixed_now())
            .await
            .unwrap();
        assert_eq!(stored.user_email, "a@x.com");
        assert_eq!(stored.device_id.as_deref(), Some("d1"));
        assert_eq!(stored.created_at, Some(fixed_now()));
    }

    fn unassign_edit() -> DeviceEdit {
        serde_json::from_value(serde_json::json!({
            "asset_number": "IT-1",
            "serial_number": "SN-1",
            "device_type": "Laptop",
            "status": "not_working",
            "assigned_to": "a@x.com",
            "assigned_date": "2026-03-02"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_device_sends_cleared_assignment() {
        let mut store = MockRecordStore::new();
        store
            .expect_update_device()
            .withf(|id, patch| {
                id == "d1" && patch.assigned_to.is_none() && patch.assigned_date.is_none()
            })
            .times(1)
            .returning(|_, patch| {
                let mut device = create_test_device("1", "assigned");
                patch.apply(&mut device);
                Ok(device)
            });

        let device = service_with(store)
            .update_device("d1", unassign_edit(), fixed_now())
            .await
            .unwrap();
        assert_eq!(device.status.as_str(), "not_working");
        assert_eq!(device.updated_at, Some(fixed_now()));
    }

    #[tokio::test]
    async fn test_update_missing_device_is_not_found() {
        let mut store = MockRecordStore::new();
        store.expect_update_device().returning(|id, _| {
            Err(StoreError::NotFound {
                table: "devices".to_string(),
                id: id.to_string(),
            })
        });

        let err = service_with(store)
            .update_device("d9", unassign_edit(), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.details(), "no devices row with id d9");
    }

    #[tokio::test]
    async fn test_review_and_issue_update_with_snapshot_store() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "device_requests": [{"id": "r1", "status": "pending"}],
            "issue_reports": [{"id": "i1", "severity": "critical", "status": "in_progress"}],
            "users": [{"id": "u1", "email": "a@x.com"}]
        }))
        .unwrap();
        let service = InventoryService::new(SnapshotStore::new(snapshot), ReportsConfig::default());

        let review: RequestReview = serde_json::from_value(serde_json::json!({
            "status": "approved",
            "reviewed_by": "admin@x.com"
        }))
        .unwrap();
        let request = service
            .review_request("r1", review, fixed_now())
            .await
            .unwrap();
        assert_eq!(request.reviewed_at, Some(fixed_now()));
        assert_eq!(service.request_stats().await.unwrap().approved, 1);

        let update: IssueUpdate =
            serde_json::from_value(serde_json::json!({"status": "resolved"})).unwrap();
        let issue = service.update_issue("i1", update, fixed_now()).await.unwrap();
        assert_eq!(issue.resolved_at, Some(fixed_now()));
        assert_eq!(service.issue_stats().await.unwrap().critical_open, 0);

        assert_eq!(service.users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_edit_skips_store() {
        let mut store = MockRecordStore::new();
        store.expect_update_device().never();

        let edit: DeviceEdit =
            serde_json::from_value(serde_json::json!({"status": "available"})).unwrap();
        let err = service_with(store)
            .update_device("d1", edit, fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
