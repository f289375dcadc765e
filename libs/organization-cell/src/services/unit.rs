use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateUnitRequest, Unit, UpdateUnitRequest};

pub struct UnitService {
    supabase: Arc<SupabaseClient>,
}

impl UnitService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(tenant_id: Uuid, unit_id: Uuid) -> Query {
        Query::table("units")
            .eq("id", unit_id)
            .eq("tenant_id", tenant_id)
    }

    pub async fn create_unit(
        &self,
        tenant_id: Uuid,
        request: CreateUnitRequest,
        auth_token: &str,
    ) -> Result<Unit, AppError> {
        request.validate()?;
        debug!("Creating unit {} for tenant {}", request.name, tenant_id);

        let unit_data = json!({
            "tenant_id": tenant_id,
            "name": request.name,
            "address": request.address,
            "timezone": request.timezone_or_default(),
        });

        let unit: Unit = self
            .supabase
            .insert("units", &unit_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Unit {} created", unit.id);
        Ok(unit)
    }

    pub async fn list_units(&self, tenant_id: Uuid, auth_token: &str) -> Result<Vec<Unit>, AppError> {
        let query = Query::table("units")
            .eq("tenant_id", tenant_id)
            .order("name", Order::Asc);

        Ok(self
            .supabase
            .select(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?)
    }

    pub async fn get_unit(&self, tenant_id: Uuid, unit_id: Uuid, auth_token: &str) -> Result<Unit, AppError> {
        self.supabase
            .select_one(&Self::by_id(tenant_id, unit_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Unit {} not found", unit_id)))
    }

    pub async fn update_unit(
        &self,
        tenant_id: Uuid,
        unit_id: Uuid,
        request: UpdateUnitRequest,
        auth_token: &str,
    ) -> Result<Unit, AppError> {
        request.validate()?;

        Ok(self
            .supabase
            .update(
                &Self::by_id(tenant_id, unit_id),
                &request,
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?)
    }

    pub async fn delete_unit(&self, tenant_id: Uuid, unit_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(tenant_id, unit_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Unit {} deleted", unit_id);
        Ok(())
    }
}
