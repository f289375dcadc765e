use serde_json::Value;
use thiserror::Error;

use shared_models::error::AppError;

/// Postgres SQLSTATE raised by an `EXCLUDE` constraint.
pub const EXCLUSION_VIOLATION: &str = "23P01";
/// Postgres SQLSTATE raised by a `UNIQUE` constraint.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict ({code}): {message}")]
    Conflict { code: String, message: String },

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DbError {
    /// Maps a non-success response onto the error taxonomy. PostgREST bodies carry
    /// `code`/`message`; the auth API uses `error_description`, `msg` or `error`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|c| match c {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let message = parsed
            .as_ref()
            .and_then(|v| {
                ["message", "error_description", "msg", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status {
            401 | 403 => DbError::Auth(message),
            404 | 406 => DbError::NotFound(message),
            409 => DbError::Conflict {
                code: code.unwrap_or_default(),
                message,
            },
            _ => DbError::Api {
                status,
                code,
                message,
            },
        }
    }

    pub fn is_exclusion_violation(&self) -> bool {
        matches!(self, DbError::Conflict { code, .. } if code == EXCLUSION_VIOLATION)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Conflict { code, .. } if code == UNIQUE_VIOLATION)
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Auth(msg) => AppError::Auth(msg),
            DbError::NotFound(msg) => AppError::NotFound(msg),
            DbError::Conflict { message, .. } => AppError::Conflict(message),
            DbError::InvalidRequest(msg) => AppError::BadRequest(msg),
            DbError::Transport(e) => AppError::ExternalService(e.to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}
