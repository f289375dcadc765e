use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateServiceRequest, Service, UpdateServiceRequest};

/// The `services` table: what a tenant offers and how long each one takes.
pub struct CatalogService {
    supabase: Arc<SupabaseClient>,
}

impl CatalogService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(tenant_id: Uuid, service_id: Uuid) -> Query {
        Query::table("services")
            .eq("id", service_id)
            .eq("tenant_id", tenant_id)
    }

    pub async fn create_service(
        &self,
        tenant_id: Uuid,
        request: CreateServiceRequest,
        auth_token: &str,
    ) -> Result<Service, AppError> {
        request.validate()?;
        debug!("Creating service {} ({} min)", request.name, request.duration_min);

        let service_data = json!({
            "tenant_id": tenant_id,
            "name": request.name,
            "duration_min": request.duration_min,
            "base_price": request.base_price,
            "active": request.active.unwrap_or(true),
        });

        let service: Service = self
            .supabase
            .insert("services", &service_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Service {} created", service.id);
        Ok(service)
    }

    /// Active services only, by name.
    pub async fn list_services(&self, tenant_id: Uuid, auth_token: &str) -> Result<Vec<Service>, AppError> {
        let query = Query::table("services")
            .eq("tenant_id", tenant_id)
            .eq("active", true)
            .order("name", Order::Asc);

        Ok(self
            .supabase
            .select(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?)
    }

    pub async fn get_service(&self, tenant_id: Uuid, service_id: Uuid, auth_token: &str) -> Result<Service, AppError> {
        self.supabase
            .select_one(&Self::by_id(tenant_id, service_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", service_id)))
    }

    pub async fn update_service(
        &self,
        tenant_id: Uuid,
        service_id: Uuid,
        request: UpdateServiceRequest,
        auth_token: &str,
    ) -> Result<Service, AppError> {
        request.validate()?;

        Ok(self
            .supabase
            .update(
                &Self::by_id(tenant_id, service_id),
                &request,
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?)
    }

    pub async fn delete_service(&self, tenant_id: Uuid, service_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(tenant_id, service_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Service {} deleted", service_id);
        Ok(())
    }
}
