use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Application payload plus the registered time claims added at signing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignedClaims<T> {
    #[serde(flatten)]
    pub data: T,
    pub iat: i64,
    pub exp: i64,
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation
}

/// Signs `data` with HS256, valid for `expires_in` from now.
pub fn generate_jwt<T: Serialize>(
    data: T,
    secret: &str,
    expires_in: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = SignedClaims {
        data,
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Payload of a valid, unexpired token; `None` on any failure.
pub fn verify_jwt<T: DeserializeOwned>(token: &str, secret: &str) -> Option<T> {
    decode::<SignedClaims<T>>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation())
        .map(|data| data.claims.data)
        .map_err(|e| debug!("JWT verification failed: {}", e))
        .ok()
}

/// Validates an access token issued by the auth backend and maps it to the
/// request user, including the tenant carried in its metadata.
pub fn validate_access_token(token: &str, jwt_secret: &str) -> Result<User, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => {
            debug!("Token rejected: {}", e);
            TokenError::Invalid(e.to_string())
        }
    })?;

    let claims = data.claims;
    let created_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        tenant_id: claims.tenant_id(),
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}
