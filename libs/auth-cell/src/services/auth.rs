use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, instrument, warn};

use organization_cell::models::{AuthProvider, CreateTenantRequest, CreateUserRequest, UserRole};
use organization_cell::services::{TenantService, UserService};
use shared_database::auth::{AuthApi, AuthSession, AuthUser};
use shared_database::{CredentialTier, DbError, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{LoginRequest, RefreshRequest, SignupRequest, SignupResponse};

/// Client errors from the auth backend (bad credentials, expired refresh
/// tokens, taken e-mails) surface as authentication failures.
fn auth_error(err: DbError) -> AppError {
    match err {
        DbError::Api { status, message, .. } if (400..500).contains(&status) => AppError::Auth(message),
        other => AppError::from(other),
    }
}

pub struct AuthService {
    supabase: Arc<SupabaseClient>,
}

impl AuthService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn api(&self) -> AuthApi<'_> {
        AuthApi::new(&self.supabase)
    }

    /// Creates the tenant, its auth user and the matching admin row in `users`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up_business(&self, request: SignupRequest) -> Result<SignupResponse, AppError> {
        request.validate()?;

        let tenant = TenantService::new(self.supabase.clone())
            .create_tenant(CreateTenantRequest {
                name: request.tenant_name.clone(),
                plan: None,
                status: None,
            })
            .await?;

        let metadata = json!({ "name": request.name, "tenant_id": tenant.id });
        let outcome = self
            .api()
            .sign_up(&request.email, &request.password, metadata)
            .await
            .map_err(|e| {
                warn!("Auth sign-up failed after creating tenant {}", tenant.id);
                auth_error(e)
            })?;

        let user = UserService::new(self.supabase.clone())
            .create_user(
                tenant.id,
                CreateUserRequest {
                    name: request.name,
                    email: request.email,
                    phone: request.phone,
                    role: UserRole::Admin,
                    password: None,
                    auth_provider: Some(AuthProvider::Supabase),
                },
                CredentialTier::Privileged,
            )
            .await?;

        info!("Business {} signed up with admin {}", tenant.id, outcome.user.id);
        Ok(SignupResponse {
            tenant,
            user,
            session: outcome.session,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_in(&self, request: LoginRequest) -> Result<AuthSession, AppError> {
        request.validate()?;
        let session = self
            .api()
            .sign_in(&request.email, &request.password)
            .await
            .map_err(auth_error)?;
        debug!("User {} signed in", session.user.id);
        Ok(session)
    }

    pub async fn refresh(&self, request: RefreshRequest) -> Result<AuthSession, AppError> {
        request.validate()?;
        self.api().refresh(&request.refresh_token).await.map_err(auth_error)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.api().sign_out(access_token).await.map_err(auth_error)
    }

    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        self.api().get_user(access_token).await.map_err(auth_error)
    }
}
