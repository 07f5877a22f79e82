//! HTTP API.
//!
//! Thin axum layer over [`InventoryService`]. Every handler is stateless
//! apart from the shared service and evaluates "now" per request.

use crate::notify::NotificationRequest;
use crate::report::{ReportFilter, ReportKind};
use crate::service::{InventoryService, ServiceError};
use crate::store::RecordStore;
use crate::updates::{DeviceEdit, IssueUpdate, RequestReview};
use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Error document returned by every failing endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, details: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                details: details.into(),
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidRequest(ref msg) => {
                ApiError::new(StatusCode::BAD_REQUEST, msg, msg.as_str())
            }
            ServiceError::NotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, err.label(), err.details())
            }
            _ => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.label(),
                err.details(),
            ),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid query parameters",
            rejection.body_text(),
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct NotificationSent<T> {
    success: bool,
    message: &'static str,
    notification: T,
}

/// Build the router over a shared service.
pub fn router<S: RecordStore + 'static>(service: Arc<InventoryService<S>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analytics", get(analytics::<S>))
        .route("/api/reports/:kind", get(report::<S>))
        .route("/api/requests/stats", get(request_stats::<S>))
        .route("/api/issues/stats", get(issue_stats::<S>))
        .route("/api/send-notification", post(send_notification::<S>))
        .route("/api/devices/:id", patch(update_device::<S>))
        .route("/api/requests/:id", patch(review_request::<S>))
        .route("/api/issues/:id", patch(update_issue::<S>))
        .route("/api/users", get(users::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the API until the process is stopped.
pub async fn run<S: RecordStore + 'static>(service: InventoryService<S>, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(Arc::new(service)))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn analytics<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(service.analytics(Utc::now()).await?))
}

async fn report<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
    Path(kind): Path<String>,
    query: Result<Query<ReportFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(filter) = query?;
    let kind: ReportKind = kind.parse().map_err(|unknown: String| {
        ApiError::new(StatusCode::BAD_REQUEST, "Unknown report type", unknown)
    })?;

    Ok(Json(service.report(kind, &filter, Utc::now()).await?))
}

async fn request_stats<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(service.request_stats().await?))
}

async fn issue_stats<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(service.issue_stats().await?))
}

async fn send_notification<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
    body: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let notification = service.notify_assignment(request, Utc::now()).await?;

    Ok(Json(NotificationSent {
        success: true,
        message: "Notification sent successfully",
        notification,
    }))
}

async fn update_device<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
    Path(id): Path<String>,
    body: Result<Json<DeviceEdit>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(edit) = body?;
    Ok(Json(service.update_device(&id, edit, Utc::now()).await?))
}

async fn review_request<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
    Path(id): Path<String>,
    body: Result<Json<RequestReview>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(review) = body?;
    Ok(Json(service.review_request(&id, review, Utc::now()).await?))
}

async fn update_issue<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
    Path(id): Path<String>,
    body: Result<Json<IssueUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) = body?;
    Ok(Json(service.update_issue(&id, update, Utc::now()).await?))
}

async fn users<S: RecordStore + 'static>(
    State(service): State<Arc<InventoryService<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = service.users().await?;
    Ok(Json(json!({ "users": users })))
}
