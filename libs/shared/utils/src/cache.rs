//! Key and expiry helpers for callers that keep their own cache.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::Utc;

pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 120;

/// `prefix:k1:v1|k2:v2` with keys sorted, so equal parameter sets share a key.
pub fn generate_cache_key<K, V>(prefix: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: Into<String>,
    V: Display,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect();

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join("|");

    format!("{}:{}", prefix, joined)
}

/// Unix timestamp `ttl_seconds` from now.
pub fn cache_expiry(ttl_seconds: u64) -> i64 {
    Utc::now().timestamp() + ttl_seconds as i64
}
