//! Thin wrapper over the hosted auth API (`/auth/v1`). No session state is kept
//! locally; tokens are handed back to the caller as-is.

use chrono::{DateTime, Utc};
use reqwest::{header::HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::DbError;
use crate::supabase::{CredentialTier, SupabaseClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Sign-up answers with a session when e-mail confirmation is disabled and with
/// the bare user otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

pub struct AuthApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome, DbError> {
        debug!("Signing up {}", email);

        let body = json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        let raw: Value = self
            .client
            .request(Method::POST, "/auth/v1/signup", CredentialTier::UserScoped(None), Some(body))
            .await?;

        let outcome = if raw.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(raw)?;
            SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            }
        } else {
            SignUpOutcome {
                user: serde_json::from_value(raw)?,
                session: None,
            }
        };

        info!("Auth user {} created", outcome.user.id);
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, DbError> {
        debug!("Password sign-in for {}", email);

        self.client
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                CredentialTier::UserScoped(None),
                Some(json!({ "email": email, "password": password })),
            )
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, DbError> {
        self.client
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=refresh_token",
                CredentialTier::UserScoped(None),
                Some(json!({ "refresh_token": refresh_token })),
            )
            .await
    }

    /// Revokes the refresh tokens of the session `access_token` belongs to.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), DbError> {
        self.client
            .send(
                Method::POST,
                "/auth/v1/logout",
                CredentialTier::UserScoped(Some(access_token)),
                None,
                HeaderMap::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, DbError> {
        self.client
            .request(
                Method::GET,
                "/auth/v1/user",
                CredentialTier::UserScoped(Some(access_token)),
                None,
            )
            .await
    }
}
