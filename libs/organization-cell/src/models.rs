use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_config::DEFAULT_TIMEZONE;
use shared_models::error::ValidationErrors;
use shared_utils::validation::{Validate, Validator};

// ==============================================================================
// TENANTS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TenantPlan {
    #[default]
    Free,
    Basic,
    Premium,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub plan: TenantPlan,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub plan: Option<TenantPlan>,
    pub status: Option<TenantStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTenantRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<TenantPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
}

impl Validate for CreateTenantRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new().length("name", &self.name, 2, 100).finish()
    }
}

impl Validate for UpdateTenantRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, 100);
        }
        v.finish()
    }
}

// ==============================================================================
// UNITS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub address: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUnitRequest {
    pub name: String,
    pub address: String,
    pub timezone: Option<String>,
}

impl CreateUnitRequest {
    pub fn timezone_or_default(&self) -> &str {
        self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUnitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn check_timezone(v: &mut Validator, timezone: &str) {
    v.check(
        timezone.parse::<Tz>().is_ok(),
        "timezone",
        "invalid_timezone",
        format!("Unknown timezone: {}", timezone),
    );
}

impl Validate for CreateUnitRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.length("name", &self.name, 2, 100)
            .min_length("address", &self.address, 10);
        check_timezone(&mut v, self.timezone_or_default());
        v.finish()
    }
}

impl Validate for UpdateUnitRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, 100);
        }
        if let Some(address) = &self.address {
            v.min_length("address", address, 10);
        }
        if let Some(timezone) = &self.timezone {
            check_timezone(&mut v, timezone);
        }
        v.finish()
    }
}

// ==============================================================================
// STAFF USERS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Professional,
    Reception,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Professional => write!(f, "professional"),
            UserRole::Reception => write!(f, "reception"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Supabase,
    Google,
    Microsoft,
}

/// A row of the `users` table: staff of a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub auth_provider: Option<AuthProvider>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub password: Option<String>,
    pub auth_provider: Option<AuthProvider>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.length("name", &self.name, 2, 100)
            .email("email", &self.email)
            .phone("phone", self.phone.as_deref());
        if let Some(password) = &self.password {
            v.min_length("password", password, 8);
        }
        v.finish()
    }
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, 100);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        v.phone("phone", self.phone.as_deref());
        v.finish()
    }
}

// ==============================================================================
// SERVICE CATALOG
// ==============================================================================

/// Something a tenant sells; its duration is the width of a booked slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub duration_min: u32,
    pub base_price: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub duration_min: u32,
    pub base_price: f64,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pub const MIN_SERVICE_DURATION: u32 = 15;
pub const MAX_SERVICE_DURATION: u32 = 480;
pub const MAX_BASE_PRICE: f64 = 10_000.0;

impl Validate for CreateServiceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .range("duration_min", self.duration_min, MIN_SERVICE_DURATION, MAX_SERVICE_DURATION)
            .range("base_price", self.base_price, 0.0, MAX_BASE_PRICE)
            .finish()
    }
}

impl Validate for UpdateServiceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, 100);
        }
        if let Some(duration) = self.duration_min {
            v.range("duration_min", duration, MIN_SERVICE_DURATION, MAX_SERVICE_DURATION);
        }
        if let Some(price) = self.base_price {
            v.range("base_price", price, 0.0, MAX_BASE_PRICE);
        }
        v.finish()
    }
}
