use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, AppSettings};
use shared_models::auth::User;

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the backend URL at a mock server.
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            settings: AppSettings::default(),
        }
    }

    pub fn to_state(&self) -> AppState {
        AppState::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub tenant_id: Option<Uuid>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "admin".to_string(),
            tenant_id: Some(Uuid::new_v4()),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str, tenant_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            tenant_id: Some(tenant_id),
        }
    }

    pub fn admin(tenant_id: Uuid) -> Self {
        Self::new("admin@example.com", "admin", tenant_id)
    }

    pub fn reception(tenant_id: Uuid) -> Self {
        Self::new("reception@example.com", "reception", tenant_id)
    }

    pub fn without_tenant() -> Self {
        Self {
            tenant_id: None,
            ..Self::default()
        }
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            tenant_id: self.tenant_id,
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let app_metadata = match user.tenant_id {
            Some(tenant_id) => json!({ "provider": "email", "tenant_id": tenant_id }),
            None => json!({ "provider": "email" }),
        };

        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "aud": "authenticated",
            "app_metadata": app_metadata,
            "user_metadata": {},
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("test token encodes")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes as PostgREST returns them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn tenant_response(tenant_id: &str) -> Value {
        json!({
            "id": tenant_id,
            "name": "Studio Bela",
            "plan": "free",
            "status": "active",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn unit_response(unit_id: &str, tenant_id: &str) -> Value {
        json!({
            "id": unit_id,
            "tenant_id": tenant_id,
            "name": "Unidade Centro",
            "address": "Rua Augusta, 1500 - Sao Paulo",
            "timezone": "America/Sao_Paulo",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn user_response(user_id: &str, tenant_id: &str) -> Value {
        json!({
            "id": user_id,
            "tenant_id": tenant_id,
            "name": "Owner",
            "email": "owner@example.com",
            "phone": null,
            "role": "admin",
            "auth_provider": "supabase",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn professional_response(professional_id: &str, unit_id: &str) -> Value {
        json!({
            "id": professional_id,
            "unit_id": unit_id,
            "name": "Carla Mendes",
            "bio": null,
            "active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn customer_response(customer_id: &str, tenant_id: &str) -> Value {
        json!({
            "id": customer_id,
            "tenant_id": tenant_id,
            "name": "Joana Lima",
            "email": "joana@example.com",
            "phone": "+5511987654321",
            "consent_flags": { "marketing": false, "reminders": true, "notifications": true },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn service_response(service_id: &str, tenant_id: &str, duration_min: u32) -> Value {
        json!({
            "id": service_id,
            "tenant_id": tenant_id,
            "name": "Corte feminino",
            "duration_min": duration_min,
            "base_price": 120.0,
            "active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn schedule_rule_response(calendar_id: &str, day_of_week: u8, start: &str, end: &str, slot_min: u32) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "calendar_id": calendar_id,
            "day_of_week": day_of_week,
            "start_time": start,
            "end_time": end,
            "slot_min": slot_min,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn time_off_response(calendar_id: &str, start: &str, end: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "calendar_id": calendar_id,
            "start": start,
            "end": end,
            "reason": "Consulta medica",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn appointment_response(
        appointment_id: &str,
        tenant_id: &str,
        unit_id: &str,
        professional_id: &str,
        service_id: &str,
        start: &str,
        end: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": appointment_id,
            "tenant_id": tenant_id,
            "unit_id": unit_id,
            "customer_id": Uuid::new_v4(),
            "professional_id": professional_id,
            "service_id": service_id,
            "start": start,
            "end": end,
            "status": status,
            "source": "web",
            "price_estimate": 120.0,
            "notes": null,
            "idempotency_key": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn notification_response(notification_id: &str, tenant_id: &str) -> Value {
        json!({
            "id": notification_id,
            "tenant_id": tenant_id,
            "channel": "email",
            "to": "joana@example.com",
            "template_code": "appointment_confirmed",
            "payload_json": { "appointment_id": "a-1" },
            "status": "pending",
            "scheduled_for": "2024-05-06T11:00:00Z",
            "sent_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn auth_session_response(user_id: &str, email: &str) -> Value {
        json!({
            "access_token": "access-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {
                "id": user_id,
                "email": email,
                "user_metadata": {},
                "app_metadata": { "provider": "email" },
                "created_at": "2024-01-01T00:00:00Z"
            }
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "details": null,
            "hint": null,
            "message": message
        })
    }
}
