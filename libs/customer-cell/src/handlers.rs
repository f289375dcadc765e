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

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_tenant;
use shared_utils::{AppState, PaginatedResponse};

use crate::models::{CreateCustomerRequest, Customer, CustomerListQuery, UpdateCustomerRequest};
use crate::services::CustomerService;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

pub async fn create_customer(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let tenant_id = require_tenant(&user)?;
    let customer = CustomerService::new(state.db.clone())
        .create_customer(tenant_id, request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(params): Query<CustomerListQuery>,
) -> Result<Json<PaginatedResponse<Customer>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let page = CustomerService::new(state.db.clone())
        .list_customers(tenant_id, &params, auth.token())
        .await?;
    Ok(Json(page))
}

pub async fn get_customer_by_email(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Customer>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let customer = CustomerService::new(state.db.clone())
        .get_customer_by_email(tenant_id, &query.email, auth.token())
        .await?;
    Ok(Json(customer))
}

pub async fn get_customer(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let customer = CustomerService::new(state.db.clone())
        .get_customer(tenant_id, customer_id, auth.token())
        .await?;
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let customer = CustomerService::new(state.db.clone())
        .update_customer(tenant_id, customer_id, request, auth.token())
        .await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let tenant_id = require_tenant(&user)?;
    CustomerService::new(state.db.clone())
        .delete_customer(tenant_id, customer_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}
