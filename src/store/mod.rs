//! Record store access.
//!
//! The hosted backend owns persistence; this module defines the seam the
//! service talks to and the two implementations behind it: the REST client
//! used in production and a JSON snapshot used offline.

mod rest;
mod snapshot;

pub use rest::RestStore;
pub use snapshot::SnapshotStore;
#[cfg(test)]
pub(crate) use snapshot::Snapshot;

use crate::models::{AuthUser, Device, DeviceRequest, IssueReport};
use crate::notify::{NewNotification, Notification};
use crate::updates::{DevicePatch, IssuePatch, RequestReviewPatch};
use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to backend at {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {table} rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("backend returned no row for insert into {0}")]
    EmptyInsert(String),

    #[error("no {table} row with id {id}")]
    NotFound { table: String, id: String },

    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read and write access to the inventory tables.
///
/// Every fetch returns the complete table; callers filter in memory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_devices(&self) -> StoreResult<Vec<Device>>;

    async fn fetch_device_requests(&self) -> StoreResult<Vec<DeviceRequest>>;

    async fn fetch_issue_reports(&self) -> StoreResult<Vec<IssueReport>>;

    /// Insert a notification and return the stored row.
    async fn insert_notification(&self, notification: &NewNotification)
        -> StoreResult<Notification>;

    /// Patch a device and return the updated row.
    async fn update_device(&self, id: &str, patch: &DevicePatch) -> StoreResult<Device>;

    async fn review_device_request(
        &self,
        id: &str,
        patch: &RequestReviewPatch,
    ) -> StoreResult<DeviceRequest>;

    async fn update_issue_report(&self, id: &str, patch: &IssuePatch)
        -> StoreResult<IssueReport>;

    /// Every account in the auth directory.
    async fn list_users(&self) -> StoreResult<Vec<AuthUser>>;
}
