use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::ValidationErrors;
use shared_utils::pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
use shared_utils::validation::{Validate, Validator};

/// What the customer agreed to be contacted about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsentFlags {
    #[serde(default)]
    pub marketing: bool,
    #[serde(default = "enabled")]
    pub reminders: bool,
    #[serde(default = "enabled")]
    pub notifications: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ConsentFlags {
    fn default() -> Self {
        Self {
            marketing: false,
            reminders: true,
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub consent_flags: ConsentFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub consent_flags: ConsentFlags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_flags: Option<ConsentFlags>,
}

impl Validate for CreateCustomerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .email("email", &self.email)
            .phone("phone", self.phone.as_deref())
            .finish()
    }
}

impl Validate for UpdateCustomerRequest {
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

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Query string of `GET /customers`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for CustomerListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl CustomerListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
