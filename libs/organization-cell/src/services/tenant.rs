use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateTenantRequest, Tenant, UpdateTenantRequest};

/// Tenant provisioning runs with the service-role key: a tenant row exists before
/// any user can be bound to it.
pub struct TenantService {
    supabase: Arc<SupabaseClient>,
}

impl TenantService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, AppError> {
        request.validate()?;
        debug!("Creating tenant {}", request.name);

        let tenant_data = json!({
            "name": request.name,
            "plan": request.plan.unwrap_or_default(),
            "status": request.status.unwrap_or_default(),
        });

        let tenant: Tenant = self
            .supabase
            .insert("tenants", &tenant_data, CredentialTier::Privileged)
            .await?;

        info!("Tenant {} created", tenant.id);
        Ok(tenant)
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        let query = Query::table("tenants").eq("id", tenant_id);
        self.supabase
            .select_one(&query, CredentialTier::Privileged)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))
    }

    pub async fn update_tenant(&self, tenant_id: Uuid, request: UpdateTenantRequest) -> Result<Tenant, AppError> {
        request.validate()?;
        debug!("Updating tenant {}", tenant_id);

        let query = Query::table("tenants").eq("id", tenant_id);
        Ok(self
            .supabase
            .update(&query, &request, CredentialTier::Privileged)
            .await?)
    }
}
