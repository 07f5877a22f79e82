//! In-app notifications for device assignments.

use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ASSIGNMENT_TITLE: &str = "Device Assigned to You";
pub const ASSIGNMENT_TYPE: &str = "device_assignment";

/// Device details quoted in an assignment notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub id: Option<String>,
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
}

/// Body of a send-notification call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
}

/// A notification row about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    pub user_email: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub device_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored notification row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_email: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    /// Build the notification row, or `None` when the email or the device
    /// details are missing.
    pub fn into_notification(self, now: DateTime<Utc>) -> Option<NewNotification> {
        let user_email = self.user_email.filter(|e| !e.trim().is_empty())?;
        let device = self.device_info?;

        Some(NewNotification {
            user_email,
            title: ASSIGNMENT_TITLE.to_string(),
            message: assignment_message(&device),
            notification_type: ASSIGNMENT_TYPE.to_string(),
            device_id: device.id,
            read: false,
            created_at: now,
        })
    }
}

/// The message body listing the assigned device.
pub fn assignment_message(device: &DeviceInfo) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut lines = Vec::new();
    lines.push("A device has been assigned to you!".to_string());
    lines.push(String::new());
    lines.push("Device Details:".to_string());
    lines.push(format!("• Asset Number: {}", field(&device.asset_number)));
    lines.push(format!("• Serial Number: {}", field(&device.serial_number)));
    lines.push(format!("• Device Type: {}", field(&device.device_type)));
    lines.push(format!(
        "• Brand/Model: {} {}",
        field(&device.brand),
        field(&device.model)
    ));

    lines.join("\n")
}
