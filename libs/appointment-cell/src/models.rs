use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use customer_cell::models::{ConsentFlags, CreateCustomerRequest};
use shared_database::DbError;
use shared_models::error::{AppError, ValidationErrors};
use shared_utils::pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use shared_utils::validation::{parse_date_only, Validate, Validator};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    NoShow,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
        AppointmentStatus::Completed,
    ];

    /// Statuses that release the professional's time.
    pub const RELEASED: [AppointmentStatus; 2] = [AppointmentStatus::Cancelled, AppointmentStatus::NoShow];

    pub fn occupies_slot(&self) -> bool {
        !Self::RELEASED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSource {
    #[default]
    Web,
    Phone,
    WalkIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub customer_id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    pub price_estimate: f64,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub duration_min: u32,
    pub base_price: f64,
}

/// Appointment row with its related rows embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub customer: Option<CustomerSummary>,
    pub professional: Option<NamedRef>,
    pub service: Option<ServiceSummary>,
    pub unit: Option<NamedRef>,
}

/// Embedded select used by list and get.
pub const DETAILS_SELECT: &str =
    "*,customer:customers(name,email,phone),professional:professionals(name),service:services(name,duration_min,base_price),unit:units(name)";

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

pub const MAX_NOTES_LENGTH: usize = 500;
pub const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 255;

/// Inline customer for bookings made without an existing customer id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerData> for CreateCustomerRequest {
    fn from(data: CustomerData) -> Self {
        CreateCustomerRequest {
            name: data.name,
            email: data.email,
            phone: data.phone,
            consent_flags: ConsentFlags::default(),
        }
    }
}

fn check_customer_data(v: &mut Validator, data: &CustomerData) {
    v.length("customer_data.name", &data.name, 2, 100)
        .email("customer_data.email", &data.email)
        .phone("customer_data.phone", data.phone.as_deref());
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub unit_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    pub start: DateTime<Utc>,
    pub customer_data: Option<CustomerData>,
    pub source: Option<AppointmentSource>,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
}

impl Validate for CreateAppointmentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(
            self.customer_id.is_some() || self.customer_data.is_some(),
            "customer_id",
            "required",
            "Either customer_id or customer_data is required",
        );
        if let Some(data) = &self.customer_data {
            check_customer_data(&mut v, data);
        }
        v.max_length("notes", self.notes.as_deref(), MAX_NOTES_LENGTH);
        if let Some(key) = &self.idempotency_key {
            v.length("idempotency_key", key, 1, MAX_IDEMPOTENCY_KEY_LENGTH);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn moves_time(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

impl Validate for UpdateAppointmentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            v.interval("end", start, end);
        }
        v.max_length("notes", self.notes.as_deref(), MAX_NOTES_LENGTH);
        v.finish()
    }
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Query string of `GET /appointments`. `from`/`to` bound the start instant.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub unit_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Default for AppointmentListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            unit_id: None,
            professional_id: None,
            customer_id: None,
            status: None,
            from: None,
            to: None,
        }
    }
}

impl AppointmentListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub unit_id: Uuid,
    pub service_id: Uuid,
    pub date: String,
}

impl AvailabilityRequest {
    pub fn parsed_date(&self) -> Result<NaiveDate, ValidationErrors> {
        parse_date_only(&self.date).ok_or_else(|| {
            ValidationErrors::single("date", "invalid_date", "Date must be in YYYY-MM-DD format")
        })
    }
}

impl Validate for AvailabilityRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new().date_only("date", &self.date).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    pub professional_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub unit_id: Uuid,
    pub service_id: Uuid,
    pub slots: Vec<AvailabilitySlot>,
}

// ==============================================================================
// REPORT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFilters {
    pub from: String,
    pub to: String,
    pub unit_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Validate for ReportFilters {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.date_only("from", &self.from)
            .date_only("to", &self.to)
            .range("page", self.page, 1, u32::MAX)
            .range("limit", self.limit, 1, MAX_LIMIT);
        if let (Some(from), Some(to)) = (parse_date_only(&self.from), parse_date_only(&self.to)) {
            v.check(from <= to, "to", "invalid_range", "to must not be before from");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentReport {
    pub total: u64,
    pub by_status: BTreeMap<AppointmentStatus, u64>,
    pub by_professional: BTreeMap<Uuid, u64>,
    pub by_unit: BTreeMap<Uuid, u64>,
    pub by_date: BTreeMap<String, u64>,
}

// ==============================================================================
// PAYMENT MODELS
// ==============================================================================

pub const PAYMENT_CURRENCY: &str = "BRL";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Mercadopago,
    Stripe,
}

/// Payment intent for an appointment. Only validated here; no provider is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub appointment_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub customer_data: CustomerData,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(self.amount > 0.0, "amount", "too_small", "amount must be positive")
            .check(
                self.currency == PAYMENT_CURRENCY,
                "currency",
                "invalid_currency",
                format!("currency must be {}", PAYMENT_CURRENCY),
            );
        check_customer_data(&mut v, &self.customer_data);
        v.finish()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Professional {professional_id} is already booked between {start} and {end}")]
    Conflict {
        professional_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Service {0} is not active")]
    InactiveService(Uuid),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error(transparent)]
    Upstream(#[from] AppError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(id) => AppError::NotFound(format!("Appointment {} not found", id)),
            e @ AppointmentError::Conflict { .. } => AppError::Conflict(e.to_string()),
            AppointmentError::InactiveService(id) => AppError::Validation(ValidationErrors::single(
                "service_id",
                "inactive_service",
                format!("Service {} is not active", id),
            )),
            AppointmentError::Validation(errors) => AppError::Validation(errors),
            AppointmentError::Storage(e) => AppError::from(e),
            AppointmentError::Upstream(e) => e,
        }
    }
}
