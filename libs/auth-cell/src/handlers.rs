use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_database::auth::AuthSession;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CurrentUser, LoginRequest, RefreshRequest, SignupRequest, SignupResponse};
use crate::services::AuthService;

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let response = AuthService::new(state.db.clone()).sign_up_business(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = AuthService::new(state.db.clone()).sign_in(request).await?;
    Ok(Json(session))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = AuthService::new(state.db.clone()).refresh(request).await?;
    Ok(Json(session))
}

pub async fn logout(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    AuthService::new(state.db.clone()).sign_out(auth.token()).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn me(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<CurrentUser>, AppError> {
    let auth_user = AuthService::new(state.db.clone()).current_user(auth.token()).await?;
    Ok(Json(CurrentUser {
        user: auth_user,
        tenant_id: user.tenant_id,
    }))
}
