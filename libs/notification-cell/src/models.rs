use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use shared_models::error::ValidationErrors;
use shared_utils::validation::{Validate, Validator};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

/// A queued message. Rows are only written here; delivery happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub channel: NotificationChannel,
    pub to: String,
    pub template_code: String,
    pub payload_json: Map<String, Value>,
    pub status: NotificationStatus,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub channel: NotificationChannel,
    pub to: String,
    pub template_code: String,
    #[serde(default)]
    pub payload_json: Map<String, Value>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotificationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NotificationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl UpdateNotificationRequest {
    pub fn sent(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(NotificationStatus::Sent),
            sent_at: Some(at),
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Some(NotificationStatus::Failed),
            ..Default::default()
        }
    }
}

impl Validate for CreateNotificationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("to", &self.to)
            .required("template_code", &self.template_code);
        if self.channel == NotificationChannel::Email && !self.to.trim().is_empty() {
            v.email("to", &self.to);
        }
        v.finish()
    }
}

impl Validate for UpdateNotificationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .check(
                self.sent_at.is_none() || self.status == Some(NotificationStatus::Sent),
                "sent_at",
                "invalid_status",
                "sent_at can only be set together with status sent",
            )
            .finish()
    }
}
