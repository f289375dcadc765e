use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateProfessionalRequest, Professional, UpdateProfessionalRequest};

pub struct ProfessionalService {
    supabase: Arc<SupabaseClient>,
}

impl ProfessionalService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(professional_id: Uuid) -> Query {
        Query::table("professionals").eq("id", professional_id)
    }

    pub async fn create_professional(
        &self,
        request: CreateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, AppError> {
        request.validate()?;
        debug!("Creating professional {} in unit {}", request.name, request.unit_id);

        let professional_data = json!({
            "unit_id": request.unit_id,
            "name": request.name,
            "bio": request.bio,
            "active": request.active.unwrap_or(true),
        });

        let professional: Professional = self
            .supabase
            .insert("professionals", &professional_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Professional {} created", professional.id);
        Ok(professional)
    }

    /// Active professionals of a unit, ordered by name.
    pub async fn list_active(
        &self,
        unit_id: Uuid,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<Professional>, AppError> {
        let query = Query::table("professionals")
            .eq("unit_id", unit_id)
            .eq("active", true)
            .order("name", Order::Asc);

        Ok(self.supabase.select(&query, tier).await?)
    }

    pub async fn get_professional(
        &self,
        professional_id: Uuid,
        tier: CredentialTier<'_>,
    ) -> Result<Professional, AppError> {
        self.supabase
            .select_one(&Self::by_id(professional_id), tier)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Professional {} not found", professional_id)))
    }

    pub async fn update_professional(
        &self,
        professional_id: Uuid,
        request: UpdateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, AppError> {
        request.validate()?;

        Ok(self
            .supabase
            .update(
                &Self::by_id(professional_id),
                &request,
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?)
    }

    pub async fn delete_professional(&self, professional_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(professional_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Professional {} deleted", professional_id);
        Ok(())
    }
}
