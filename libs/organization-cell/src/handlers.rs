use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::CredentialTier;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_tenant;
use shared_utils::AppState;

use crate::models::{
    CreateServiceRequest, CreateUnitRequest, CreateUserRequest, Service, StaffUser, Tenant, Unit,
    UpdateServiceRequest, UpdateTenantRequest, UpdateUnitRequest, UpdateUserRequest,
};
use crate::services::{CatalogService, TenantService, UnitService, UserService};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

// ==============================================================================
// TENANT HANDLERS
// ==============================================================================

pub async fn get_current_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Tenant>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let tenant = TenantService::new(state.db.clone()).get_tenant(tenant_id).await?;
    Ok(Json(tenant))
}

pub async fn update_current_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<Json<Tenant>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let tenant = TenantService::new(state.db.clone())
        .update_tenant(tenant_id, request)
        .await?;
    Ok(Json(tenant))
}

// ==============================================================================
// UNIT HANDLERS
// ==============================================================================

pub async fn create_unit(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    let tenant_id = require_tenant(&user)?;
    let unit = UnitService::new(state.db.clone())
        .create_unit(tenant_id, request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn list_units(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Unit>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let units = UnitService::new(state.db.clone())
        .list_units(tenant_id, auth.token())
        .await?;
    Ok(Json(units))
}

pub async fn get_unit(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(unit_id): Path<Uuid>,
) -> Result<Json<Unit>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let unit = UnitService::new(state.db.clone())
        .get_unit(tenant_id, unit_id, auth.token())
        .await?;
    Ok(Json(unit))
}

pub async fn update_unit(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<UpdateUnitRequest>,
) -> Result<Json<Unit>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let unit = UnitService::new(state.db.clone())
        .update_unit(tenant_id, unit_id, request, auth.token())
        .await?;
    Ok(Json(unit))
}

pub async fn delete_unit(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(unit_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let tenant_id = require_tenant(&user)?;
    UnitService::new(state.db.clone())
        .delete_unit(tenant_id, unit_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// USER HANDLERS
// ==============================================================================

pub async fn create_user(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<StaffUser>), AppError> {
    let tenant_id = require_tenant(&user)?;
    let created = UserService::new(state.db.clone())
        .create_user(tenant_id, request, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<StaffUser>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let users = UserService::new(state.db.clone())
        .list_users(tenant_id, auth.token())
        .await?;
    Ok(Json(users))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<StaffUser>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let found = UserService::new(state.db.clone())
        .get_user_by_email(tenant_id, &query.email, auth.token())
        .await?;
    Ok(Json(found))
}

pub async fn get_user(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StaffUser>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let found = UserService::new(state.db.clone())
        .get_user(tenant_id, user_id, auth.token())
        .await?;
    Ok(Json(found))
}

pub async fn update_user(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<StaffUser>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let updated = UserService::new(state.db.clone())
        .update_user(tenant_id, user_id, request, auth.token())
        .await?;
    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let tenant_id = require_tenant(&user)?;
    UserService::new(state.db.clone())
        .delete_user(tenant_id, user_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// SERVICE CATALOG HANDLERS
// ==============================================================================

pub async fn create_service(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let tenant_id = require_tenant(&user)?;
    let service = CatalogService::new(state.db.clone())
        .create_service(tenant_id, request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn list_services(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Service>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let services = CatalogService::new(state.db.clone())
        .list_services(tenant_id, auth.token())
        .await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let service = CatalogService::new(state.db.clone())
        .get_service(tenant_id, service_id, auth.token())
        .await?;
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(service_id): Path<Uuid>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let service = CatalogService::new(state.db.clone())
        .update_service(tenant_id, service_id, request, auth.token())
        .await?;
    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let tenant_id = require_tenant(&user)?;
    CatalogService::new(state.db.clone())
        .delete_service(tenant_id, service_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}
