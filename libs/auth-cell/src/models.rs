use serde::{Deserialize, Serialize};

use organization_cell::models::{StaffUser, Tenant};
use shared_database::auth::{AuthSession, AuthUser};
use shared_models::error::ValidationErrors;
use shared_utils::validation::{Validate, Validator};

pub const MIN_LOGIN_PASSWORD: usize = 6;
pub const MIN_SIGNUP_PASSWORD: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .email("email", &self.email)
            .min_length("password", &self.password, MIN_LOGIN_PASSWORD)
            .finish()
    }
}

/// Sign-up of a new business: the tenant and its first admin.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub tenant_name: String,
    pub phone: Option<String>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .email("email", &self.email)
            .min_length("password", &self.password, MIN_SIGNUP_PASSWORD)
            .length("tenant_name", &self.tenant_name, 2, 100)
            .phone("phone", self.phone.as_deref())
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new().required("refresh_token", &self.refresh_token).finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub tenant: Tenant,
    pub user: StaffUser,
    /// Absent while the e-mail address awaits confirmation.
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: AuthUser,
    pub tenant_id: Option<uuid::Uuid>,
}
