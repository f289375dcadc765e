use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::crypto::hash_password;
use shared_utils::validation::Validate;

use crate::models::{CreateUserRequest, StaffUser, UpdateUserRequest};

pub struct UserService {
    supabase: Arc<SupabaseClient>,
}

impl UserService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(tenant_id: Uuid, user_id: Uuid) -> Query {
        Query::table("users")
            .eq("id", user_id)
            .eq("tenant_id", tenant_id)
    }

    /// Inserts a staff row. A plain-text password, when given, is stored only as
    /// an Argon2 hash.
    pub async fn create_user(
        &self,
        tenant_id: Uuid,
        request: CreateUserRequest,
        tier: CredentialTier<'_>,
    ) -> Result<StaffUser, AppError> {
        request.validate()?;
        debug!("Creating {} user {} for tenant {}", request.role, request.email, tenant_id);

        let password_hash = request
            .password
            .as_deref()
            .map(hash_password)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let user_data = json!({
            "tenant_id": tenant_id,
            "name": request.name,
            "email": request.email.to_lowercase(),
            "phone": request.phone,
            "role": request.role,
            "password_hash": password_hash,
            "auth_provider": request.auth_provider,
        });

        let user: StaffUser = self.supabase.insert("users", &user_data, tier).await?;

        info!("User {} created", user.id);
        Ok(user)
    }

    pub async fn list_users(&self, tenant_id: Uuid, auth_token: &str) -> Result<Vec<StaffUser>, AppError> {
        let query = Query::table("users")
            .eq("tenant_id", tenant_id)
            .order("name", Order::Asc);

        Ok(self
            .supabase
            .select(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?)
    }

    pub async fn get_user(&self, tenant_id: Uuid, user_id: Uuid, auth_token: &str) -> Result<StaffUser, AppError> {
        self.supabase
            .select_one(&Self::by_id(tenant_id, user_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn get_user_by_email(&self, tenant_id: Uuid, email: &str, auth_token: &str) -> Result<StaffUser, AppError> {
        let query = Query::table("users")
            .eq("email", email.to_lowercase())
            .eq("tenant_id", tenant_id);

        self.supabase
            .select_one(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))
    }

    pub async fn update_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        mut request: UpdateUserRequest,
        auth_token: &str,
    ) -> Result<StaffUser, AppError> {
        request.validate()?;
        request.email = request.email.map(|e| e.to_lowercase());

        Ok(self
            .supabase
            .update(
                &Self::by_id(tenant_id, user_id),
                &request,
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?)
    }

    pub async fn delete_user(&self, tenant_id: Uuid, user_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(tenant_id, user_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("User {} deleted", user_id);
        Ok(())
    }
}
