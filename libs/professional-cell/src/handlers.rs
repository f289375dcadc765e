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

use organization_cell::services::UnitService;
use shared_database::CredentialTier;
use shared_models::auth::User;
use shared_models::error::{AppError, ValidationErrors};
use shared_utils::datetime::parse_timezone;
use shared_utils::extractor::require_tenant;
use shared_utils::validation::parse_date_only;
use shared_utils::AppState;

use crate::models::{
    CreateProfessionalRequest, CreateScheduleRuleRequest, CreateTimeOffRequest, Professional, ScheduleRule,
    TimeOff, TimeOffWindow, UpdateProfessionalRequest, UpdateScheduleRuleRequest, UpdateTimeOffRequest,
};
use crate::services::{generate_slots, Interval, ProfessionalService, ScheduleRuleService, TimeOffService};

#[derive(Debug, Deserialize)]
pub struct UnitQuery {
    pub unit_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

// ==============================================================================
// PROFESSIONAL HANDLERS
// ==============================================================================

pub async fn create_professional(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateProfessionalRequest>,
) -> Result<(StatusCode, Json<Professional>), AppError> {
    let professional = ProfessionalService::new(state.db.clone())
        .create_professional(request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(professional)))
}

pub async fn list_professionals(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<UnitQuery>,
) -> Result<Json<Vec<Professional>>, AppError> {
    let professionals = ProfessionalService::new(state.db.clone())
        .list_active(query.unit_id, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok(Json(professionals))
}

pub async fn get_professional(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Professional>, AppError> {
    let professional = ProfessionalService::new(state.db.clone())
        .get_professional(professional_id, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok(Json(professional))
}

pub async fn update_professional(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<UpdateProfessionalRequest>,
) -> Result<Json<Professional>, AppError> {
    let professional = ProfessionalService::new(state.db.clone())
        .update_professional(professional_id, request, auth.token())
        .await?;
    Ok(Json(professional))
}

pub async fn delete_professional(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ProfessionalService::new(state.db.clone())
        .delete_professional(professional_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Slots of one professional on a date, in the timezone of their unit.
pub async fn get_professional_slots(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Interval>>, AppError> {
    let tenant_id = require_tenant(&user)?;
    let date = parse_date_only(&query.date).ok_or_else(|| {
        ValidationErrors::single("date", "invalid_date", "Date must be in YYYY-MM-DD format")
    })?;
    let tier = CredentialTier::UserScoped(Some(auth.token()));

    let professional = ProfessionalService::new(state.db.clone())
        .get_professional(professional_id, tier)
        .await?;
    let unit = UnitService::new(state.db.clone())
        .get_unit(tenant_id, professional.unit_id, auth.token())
        .await?;
    let rules = ScheduleRuleService::new(state.db.clone())
        .list_rules(professional_id, tier)
        .await?;

    Ok(Json(generate_slots(&rules, date, parse_timezone(&unit.timezone))))
}

// ==============================================================================
// SCHEDULE RULE HANDLERS
// ==============================================================================

pub async fn create_schedule_rule(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateScheduleRuleRequest>,
) -> Result<(StatusCode, Json<ScheduleRule>), AppError> {
    let rule = ScheduleRuleService::new(state.db.clone())
        .create_rule(professional_id, request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_schedule_rules(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleRule>>, AppError> {
    let rules = ScheduleRuleService::new(state.db.clone())
        .list_rules(professional_id, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok(Json(rules))
}

pub async fn update_schedule_rule(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((professional_id, rule_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateScheduleRuleRequest>,
) -> Result<Json<ScheduleRule>, AppError> {
    let rule = ScheduleRuleService::new(state.db.clone())
        .update_rule(professional_id, rule_id, request, auth.token())
        .await?;
    Ok(Json(rule))
}

pub async fn delete_schedule_rule(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((professional_id, rule_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    ScheduleRuleService::new(state.db.clone())
        .delete_rule(professional_id, rule_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// TIME OFF HANDLERS
// ==============================================================================

pub async fn create_time_off(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateTimeOffRequest>,
) -> Result<(StatusCode, Json<TimeOff>), AppError> {
    let time_off = TimeOffService::new(state.db.clone())
        .create_time_off(professional_id, request, auth.token())
        .await?;
    Ok((StatusCode::CREATED, Json(time_off)))
}

pub async fn list_time_off(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(professional_id): Path<Uuid>,
    Query(window): Query<TimeOffWindow>,
) -> Result<Json<Vec<TimeOff>>, AppError> {
    let entries = TimeOffService::new(state.db.clone())
        .list_time_off(professional_id, &window, CredentialTier::UserScoped(Some(auth.token())))
        .await?;
    Ok(Json(entries))
}

pub async fn update_time_off(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((professional_id, time_off_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateTimeOffRequest>,
) -> Result<Json<TimeOff>, AppError> {
    let time_off = TimeOffService::new(state.db.clone())
        .update_time_off(professional_id, time_off_id, request, auth.token())
        .await?;
    Ok(Json(time_off))
}

pub async fn delete_time_off(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((professional_id, time_off_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    TimeOffService::new(state.db.clone())
        .delete_time_off(professional_id, time_off_id, auth.token())
        .await?;
    Ok(Json(json!({ "success": true })))
}
