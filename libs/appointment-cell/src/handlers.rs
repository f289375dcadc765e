use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_tenant;
use shared_utils::pagination::PaginatedResponse;
use shared_utils::validation::Validate;
use shared_utils::AppState;

use crate::models::{
    Appointment, AppointmentDetails, AppointmentListQuery, AppointmentReport, AvailabilityRequest,
    AvailabilityResponse, CreateAppointmentRequest, PaymentRequest, ReportFilters, UpdateAppointmentRequest,
};
use crate::services::{AvailabilityService, BookingService, ReportService};

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

/// `201` with the new appointment, or `200` with the stored one when the
/// idempotency key was already used.
pub async fn create_appointment(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let tenant_id = require_tenant(&user)?;

    let outcome = BookingService::new(state.db.clone())
        .create_appointment(tenant_id, request, auth.token())
        .await?;

    let status = if outcome.is_replay() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome.into_inner())))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<PaginatedResponse<AppointmentDetails>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let page = BookingService::new(state.db.clone())
        .list_appointments(tenant_id, &query, auth.token())
        .await?;
    Ok(Json(page))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentDetails>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let appointment = BookingService::new(state.db.clone())
        .get_appointment(tenant_id, appointment_id, auth.token())
        .await?;
    Ok(Json(appointment))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let appointment = BookingService::new(state.db.clone())
        .update_appointment(tenant_id, appointment_id, request, auth.token())
        .await?;
    Ok(Json(appointment))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let tenant_id = require_tenant(&user)?;
    BookingService::new(state.db.clone())
        .delete_appointment(tenant_id, appointment_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// AVAILABILITY & REPORTS
// ==============================================================================

pub async fn get_availability(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(request): Query<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let availability = AvailabilityService::new(state.db.clone())
        .get_availability(tenant_id, request, auth.token())
        .await?;
    Ok(Json(availability))
}

pub async fn get_report(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(filters): Query<ReportFilters>,
) -> Result<Json<AppointmentReport>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let report = ReportService::new(state.db.clone())
        .appointment_report(tenant_id, filters, auth.token())
        .await?;
    Ok(Json(report))
}

// ==============================================================================
// PAYMENTS
// ==============================================================================

/// Checks a payment request. No provider is contacted.
pub async fn validate_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Value>, AppError> {
    if !state.config.settings.enable_payments {
        return Err(AppError::BadRequest("Payments are disabled".to_string()));
    }
    request.validate()?;

    debug!("Payment request for appointment {} is valid", request.appointment_id);
    Ok(Json(json!({
        "valid": true,
        "appointment_id": request.appointment_id,
        "amount": request.amount,
        "currency": request.currency,
        "method": request.method,
    })))
}
