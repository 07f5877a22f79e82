//! REST client for the hosted backend.
//!
//! Tables are read through the PostgREST-style endpoint
//! `{url}/rest/v1/{table}`, authenticated with the project API key. The
//! user directory comes from the auth admin endpoint and needs a key with
//! admin rights.

use super::{RecordStore, StoreError, StoreResult};
use crate::config::BackendConfig;
use crate::models::{AuthUser, Device, DeviceRequest, IssueReport};
use crate::notify::{NewNotification, Notification};
use crate::updates::{DevicePatch, IssuePatch, RequestReviewPatch};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Record store backed by the hosted REST API.
#[derive(Debug, Clone)]
pub struct RestStore {
    config: BackendConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<AuthUser>,
}

impl RestStore {
    /// Create a client for the given backend.
    pub fn new(config: BackendConfig) -> StoreResult<Self> {
        info!("Using record store at {}", config.url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url(), table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.config.timeout_seconds)
        } else if e.is_connect() {
            StoreError::Connect(self.config.url.clone())
        } else {
            StoreError::Http(e)
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> StoreResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }

    fn decode<T: DeserializeOwned>(table: &str, body: &str) -> StoreResult<T> {
        serde_json::from_str(body).map_err(|source| StoreError::Decode {
            table: table.to_string(),
            source,
        })
    }

    /// Fetch every row of a table.
    async fn fetch_table<T: DeserializeOwned>(&self, table: &str) -> StoreResult<Vec<T>> {
        let url = self.table_url(table);
        debug!("Fetching {}", url);

        let request = self.authorized(self.http_client.get(&url).query(&[("select", "*")]));
        let rows: Vec<T> = Self::decode(table, &self.send(request).await?)?;

        debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    /// Patch the row with the given id and return it as stored.
    async fn patch_row<P, T>(&self, table: &str, id: &str, patch: &P) -> StoreResult<T>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.table_url(table);
        debug!("Updating {} row {}", table, id);

        let request = self.authorized(
            self.http_client
                .patch(&url)
                .query(&[("id", format!("eq.{}", id))])
                .header("Prefer", "return=representation")
                .json(patch),
        );

        let mut rows: Vec<T> = Self::decode(table, &self.send(request).await?)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn fetch_devices(&self) -> StoreResult<Vec<Device>> {
        self.fetch_table(&self.config.devices_table).await
    }

    async fn fetch_device_requests(&self) -> StoreResult<Vec<DeviceRequest>> {
        self.fetch_table(&self.config.requests_table).await
    }

    async fn fetch_issue_reports(&self) -> StoreResult<Vec<IssueReport>> {
        self.fetch_table(&self.config.issues_table).await
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> StoreResult<Notification> {
        let table = &self.config.notifications_table;
        debug!("Inserting notification for {}", notification.user_email);

        let request = self.authorized(
            self.http_client
                .post(self.table_url(table))
                .header("Prefer", "return=representation")
                .json(notification),
        );

        let mut rows: Vec<Notification> = Self::decode(table, &self.send(request).await?)?;
        if rows.is_empty() {
            return Err(StoreError::EmptyInsert(table.clone()));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update_device(&self, id: &str, patch: &DevicePatch) -> StoreResult<Device> {
        self.patch_row(&self.config.devices_table, id, patch).await
    }

    async fn review_device_request(
        &self,
        id: &str,
        patch: &RequestReviewPatch,
    ) -> StoreResult<DeviceRequest> {
        self.patch_row(&self.config.requests_table, id, patch).await
    }

    async fn update_issue_report(
        &self,
        id: &str,
        patch: &IssuePatch,
    ) -> StoreResult<IssueReport> {
        self.patch_row(&self.config.issues_table, id, patch).await
    }

    async fn list_users(&self) -> StoreResult<Vec<AuthUser>> {
        let url = format!("{}/auth/v1/admin/users", self.base_url());
        debug!("Fetching {}", url);

        let request = self.authorized(self.http_client.get(&url));
        let page: UserPage = Self::decode("users", &self.send(request).await?)?;
        debug!("Fetched {} users", page.users.len());
        Ok(page.users)
    }
}
