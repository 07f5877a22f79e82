//! Offline record store backed by a JSON snapshot file.

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{AuthUser, Device, DeviceRequest, IssueReport};
use crate::notify::{NewNotification, Notification};
use crate::updates::{DevicePatch, IssuePatch, RequestReviewPatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Contents of a snapshot file. Every table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub device_requests: Vec<DeviceRequest>,
    #[serde(default)]
    pub issue_reports: Vec<IssueReport>,
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// Record store serving a snapshot.
///
/// Updates and inserted notifications are kept in memory only; the file on
/// disk is never rewritten.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Mutex<Snapshot>,
    notifications: Mutex<Vec<Notification>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn patch_by_id<T: Clone>(
    rows: &mut [T],
    table: &str,
    id: &str,
    row_id: impl Fn(&T) -> &str,
    apply: impl FnOnce(&mut T),
) -> StoreResult<T> {
    let row = rows
        .iter_mut()
        .find(|row| row_id(row) == id)
        .ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        })?;

    apply(row);
    debug!("Updated {} row {} in memory", table, id);
    Ok(row.clone())
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Load a snapshot from disk.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| StoreError::Snapshot {
                path: path.display().to_string(),
                source,
            })?;

        info!(
            "Loaded snapshot {} ({} devices, {} requests, {} issues, {} users)",
            path.display(),
            snapshot.devices.len(),
            snapshot.device_requests.len(),
            snapshot.issue_reports.len(),
            snapshot.users.len()
        );

        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl RecordStore for SnapshotStore {
    async fn fetch_devices(&self) -> StoreResult<Vec<Device>> {
        Ok(locked(&self.snapshot).devices.clone())
    }

    async fn fetch_device_requests(&self) -> StoreResult<Vec<DeviceRequest>> {
        Ok(locked(&self.snapshot).device_requests.clone())
    }

    async fn fetch_issue_reports(&self) -> StoreResult<Vec<IssueReport>> {
        Ok(locked(&self.snapshot).issue_reports.clone())
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> StoreResult<Notification> {
        let mut stored = locked(&self.notifications);

        let row = Notification {
            id: format!("local-{}", stored.len() + 1),
            user_email: notification.user_email.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            notification_type: notification.notification_type.clone(),
            device_id: notification.device_id.clone(),
            read: notification.read,
            created_at: Some(notification.created_at),
        };

        debug!("Stored notification {} in memory", row.id);
        stored.push(row.clone());
        Ok(row)
    }

    async fn update_device(&self, id: &str, patch: &DevicePatch) -> StoreResult<Device> {
        let mut snapshot = locked(&self.snapshot);
        patch_by_id(
            &mut snapshot.devices,
            "devices",
            id,
            |d| d.id.as_str(),
            |d| patch.apply(d),
        )
    }

    async fn review_device_request(
        &self,
        id: &str,
        patch: &RequestReviewPatch,
    ) -> StoreResult<DeviceRequest> {
        let mut snapshot = locked(&self.snapshot);
        patch_by_id(
            &mut snapshot.device_requests,
            "device_requests",
            id,
            |r| r.id.as_str(),
            |r| patch.apply(r),
        )
    }

    async fn update_issue_report(
        &self,
        id: &str,
        patch: &IssuePatch,
    ) -> StoreResult<IssueReport> {
        let mut snapshot = locked(&self.snapshot);
        patch_by_id(
            &mut snapshot.issue_reports,
            "issue_reports",
            id,
            |i| i.id.as_str(),
            |i| patch.apply(i),
        )
    }

    async fn list_users(&self) -> StoreResult<Vec<AuthUser>> {
        Ok(locked(&self.snapshot).users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(
            &path,
            r#"{
                "devices": [
                    {"id": "d1", "status": "available", "created_at": "2026-01-02"}
                ],
                "issue_reports": [
                    {"id": "i1", "severity": "high", "status": "pending"}
                ]
            }"#,
        )
        .unwrap();

        let store = SnapshotStore::load(&path).unwrap();
        assert_eq!(store.fetch_devices().await.unwrap().len(), 1);
        assert!(store.fetch_device_requests().await.unwrap().is_empty());
        assert_eq!(store.fetch_issue_reports().await.unwrap().len(), 1);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = SnapshotStore::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, StoreError::Io { .. }));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"devices": [{"id": "d1"}]}"#).unwrap();
        let invalid = SnapshotStore::load(&path).unwrap_err();
        assert!(matches!(invalid, StoreError::Snapshot { .. }));
    }

    #[tokio::test]
    async fn test_notifications_kept_in_memory() {
        let store = SnapshotStore::default();
        let row = NewNotification {
            user_email: "a@x.com".to_string(),
            title: "t".to_string(),
            message: "m".to_string(),
            notification_type: "device_assignment".to_string(),
            device_id: None,
            read: false,
            created_at: chrono::Utc::now(),
        };

        let first = store.insert_notification(&row).await.unwrap();
        let second = store.insert_notification(&row).await.unwrap();
        assert_eq!(first.id, "local-1");
        assert_eq!(second.id, "local-2");
        assert_eq!(store.notifications.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_updates_are_visible_to_later_reads() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "devices": [
                    {"id": "d1", "status": "assigned", "assigned_to": "a@x.com",
                     "assigned_date": "2026-03-02", "created_at": "2026-01-02"}
                ]
            }"#,
        )
        .unwrap();
        let store = SnapshotStore::new(snapshot);
        let now = chrono::Utc::now();

        let patch = DevicePatch {
            asset_number: "IT-1".to_string(),
            serial_number: "SN-1".to_string(),
            device_type: "Laptop".to_string(),
            brand: None,
            model: None,
            status: crate::models::DeviceStatus::Available,
            notes: None,
            assigned_to: None,
            assigned_date: None,
            updated_at: now,
        };

        let updated = store.update_device("d1", &patch).await.unwrap();
        assert!(updated.assigned_to.is_none());

        let devices = store.fetch_devices().await.unwrap();
        assert!(devices[0].assigned_date.is_none());
        assert_eq!(devices[0].updated_at, Some(now));

        let missing = store.update_device("d9", &patch).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound { .. }));
    }
}
