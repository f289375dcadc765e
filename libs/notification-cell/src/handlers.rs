use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use uuid::Uuid;

use shared_database::CredentialTier;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_tenant;
use shared_utils::AppState;

use crate::models::{CreateNotificationRequest, Notification, UpdateNotificationRequest};
use crate::services::NotificationService;

pub async fn create_notification(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let tenant_id = require_tenant(&user)?;
    if !state.config.settings.enable_notifications {
        return Err(AppError::BadRequest("Notifications are disabled".to_string()));
    }

    let notification = NotificationService::new(state.db.clone())
        .create_notification(tenant_id, request, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn list_pending(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let notifications = NotificationService::new(state.db.clone())
        .list_pending_due(Some(tenant_id), Utc::now(), CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok(Json(notifications))
}

pub async fn update_notification(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<Uuid>,
    Json(request): Json<UpdateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let notification = NotificationService::new(state.db.clone())
        .update_notification(
            notification_id,
            Some(tenant_id),
            request,
            CredentialTier::UserScoped(Some(auth.token())),
        )
        .await?;
    Ok(Json(notification))
}
