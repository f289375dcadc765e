use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::query::timestamp;
use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateNotificationRequest, Notification, NotificationStatus, UpdateNotificationRequest};

pub struct NotificationService {
    supabase: Arc<SupabaseClient>,
}

impl NotificationService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Queues a notification as `pending`, due now unless `scheduled_for` says otherwise.
    pub async fn create_notification(
        &self,
        tenant_id: Uuid,
        request: CreateNotificationRequest,
        tier: CredentialTier<'_>,
    ) -> Result<Notification, AppError> {
        request.validate()?;
        debug!(
            "Queueing {} notification {} for tenant {}",
            request.template_code,
            request.to,
            tenant_id
        );

        let scheduled_for = request.scheduled_for.unwrap_or_else(Utc::now);
        let notification_data = json!({
            "tenant_id": tenant_id,
            "channel": request.channel,
            "to": request.to,
            "template_code": request.template_code,
            "payload_json": request.payload_json,
            "status": NotificationStatus::Pending,
            "scheduled_for": timestamp(&scheduled_for),
        });

        let notification: Notification = self
            .supabase
            .insert("notifications", &notification_data, tier)
            .await?;

        info!("Notification {} queued", notification.id);
        Ok(notification)
    }

    /// Pending notifications due at `now`, oldest first. `tenant_id` narrows the
    /// read to one tenant; a dispatcher running with the privileged tier passes `None`.
    pub async fn list_pending_due(
        &self,
        tenant_id: Option<Uuid>,
        now: DateTime<Utc>,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<Notification>, AppError> {
        let mut query = Query::table("notifications")
            .eq("status", NotificationStatus::Pending.as_str())
            .lte("scheduled_for", timestamp(&now));
        if let Some(tenant_id) = tenant_id {
            query = query.eq("tenant_id", tenant_id);
        }
        let query = query.order("scheduled_for", Order::Asc);

        Ok(self.supabase.select(&query, tier).await?)
    }

    pub async fn update_notification(
        &self,
        notification_id: Uuid,
        tenant_id: Option<Uuid>,
        request: UpdateNotificationRequest,
        tier: CredentialTier<'_>,
    ) -> Result<Notification, AppError> {
        request.validate()?;

        let mut query = Query::table("notifications").eq("id", notification_id);
        if let Some(tenant_id) = tenant_id {
            query = query.eq("tenant_id", tenant_id);
        }

        let notification: Notification = self.supabase.update(&query, &request, tier).await?;
        debug!("Notification {} is now {}", notification.id, notification.status.as_str());
        Ok(notification)
    }
}
