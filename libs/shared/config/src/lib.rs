use std::env;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_LOCALE: &str = "pt-BR";
pub const DEFAULT_CURRENCY: &str = "BRL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub settings: AppSettings,
}

/// Application knobs that have sensible defaults and never block startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub timezone: String,
    pub locale: String,
    pub currency: String,
    pub enable_payments: bool,
    pub enable_notifications: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,
    pub cache_ttl_seconds: u64,
    pub port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            enable_payments: false,
            enable_notifications: true,
            rate_limit_requests: 100,
            rate_limit_window_ms: 900_000,
            cache_ttl_seconds: 120,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Backend URL and
    /// both credential tiers are required; everything else falls back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let supabase_url = required("SUPABASE_URL")?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        let supabase_service_role_key = required("SUPABASE_SERVICE_ROLE_KEY")?;

        let supabase_jwt_secret = lookup("SUPABASE_JWT_SECRET").unwrap_or_else(|| {
            warn!("SUPABASE_JWT_SECRET not set, bearer tokens will be rejected");
            String::new()
        });

        let settings = AppSettings::from_lookup(&lookup)?;

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            supabase_service_role_key,
            supabase_jwt_secret,
            settings,
        })
    }

    pub fn can_validate_tokens(&self) -> bool {
        !self.supabase_jwt_secret.is_empty()
    }
}

impl AppSettings {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let settings = Self {
            timezone: lookup("TIMEZONE").unwrap_or(defaults.timezone),
            locale: lookup("DEFAULT_LOCALE").unwrap_or(defaults.locale),
            currency: defaults.currency,
            // payments are opt-in, notifications opt-out
            enable_payments: lookup("ENABLE_PAYMENTS").map(|v| v == "true").unwrap_or(false),
            enable_notifications: lookup("ENABLE_NOTIFICATIONS").map(|v| v != "false").unwrap_or(true),
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", lookup, defaults.rate_limit_requests)?,
            rate_limit_window_ms: parse_or("RATE_LIMIT_WINDOW_MS", lookup, defaults.rate_limit_window_ms)?,
            cache_ttl_seconds: parse_or("CACHE_TTL_SECONDS", lookup, defaults.cache_ttl_seconds)?,
            port: parse_or("PORT", lookup, defaults.port)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_requests < 1 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_REQUESTS",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.rate_limit_window_ms < 1000 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_WINDOW_MS",
                reason: "must be at least 1000".to_string(),
            });
        }
        if self.cache_ttl_seconds < 1 {
            return Err(ConfigError::Invalid {
                name: "CACHE_TTL_SECONDS",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SUPABASE_URL", "http://localhost:54321/"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]
    }

    #[test]
    fn test_loads_required_values_and_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&required_vars())).unwrap();

        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.supabase_service_role_key, "service");
        assert!(!config.can_validate_tokens());
        assert_eq!(config.settings, AppSettings::default());
    }

    #[test]
    fn test_missing_service_role_key_is_fatal() {
        let vars = vec![
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_KEY", "anon"),
        ];
        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"));
    }

    #[test]
    fn test_blank_url_counts_as_missing() {
        let vars = vec![
            ("SUPABASE_URL", "  "),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ];
        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_URL"));
    }

    #[test]
    fn test_settings_overrides() {
        let mut vars = required_vars();
        vars.push(("ENABLE_PAYMENTS", "true"));
        vars.push(("ENABLE_NOTIFICATIONS", "false"));
        vars.push(("CACHE_TTL_SECONDS", "300"));
        vars.push(("TIMEZONE", "Europe/Lisbon"));

        let config = AppConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert!(config.settings.enable_payments);
        assert!(!config.settings.enable_notifications);
        assert_eq!(config.settings.cache_ttl_seconds, 300);
        assert_eq!(config.settings.timezone, "Europe/Lisbon");
    }

    #[test]
    fn test_rejects_short_rate_limit_window() {
        let mut vars = required_vars();
        vars.push(("RATE_LIMIT_WINDOW_MS", "10"));
        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "RATE_LIMIT_WINDOW_MS", .. }));
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        let mut vars = required_vars();
        vars.push(("PORT", "http"));
        assert!(AppConfig::from_lookup(lookup_from(&vars)).is_err());
    }
}
