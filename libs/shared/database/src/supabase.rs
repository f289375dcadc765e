use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DbError;
use crate::query::Query;

/// Which backend key a call is made with.
///
/// `UserScoped` carries the anonymous key plus the caller's access token (if any),
/// so row-level security applies. `Privileged` carries the service-role key and
/// bypasses it; only back-office flows such as tenant provisioning use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTier<'a> {
    UserScoped(Option<&'a str>),
    Privileged,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self, tier: CredentialTier<'_>) -> Result<HeaderMap, DbError> {
        let (api_key, bearer) = match tier {
            CredentialTier::UserScoped(token) => (self.anon_key.as_str(), token),
            CredentialTier::Privileged => {
                (self.service_role_key.as_str(), Some(self.service_role_key.as_str()))
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = bearer {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }

        Ok(headers)
    }

    /// Sends a request and returns the raw response once the status is known to be
    /// a success. Non-success statuses are mapped through [`DbError::from_response`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        tier: CredentialTier<'_>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<Response, DbError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(tier)?;
        headers.extend(extra_headers);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(DbError::from_response(status.as_u16(), &error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        tier: CredentialTier<'_>,
        body: Option<Value>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, tier, body, HeaderMap::new())
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        tier: CredentialTier<'_>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, tier, body, extra_headers).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn select<T>(&self, query: &Query, tier: CredentialTier<'_>) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, &query.path(), tier, None).await
    }

    /// First row matching `query`, or `None`.
    pub async fn select_one<T>(&self, query: &Query, tier: CredentialTier<'_>) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.select(&query.clone().limit(1), tier).await?;
        Ok(rows.into_iter().next())
    }

    /// Rows for the requested page plus the exact number of rows matching the filters.
    pub async fn select_with_count<T>(
        &self,
        query: &Query,
        tier: CredentialTier<'_>,
    ) -> Result<(Vec<T>, u64), DbError>
    where
        T: DeserializeOwned,
    {
        let mut extra = HeaderMap::new();
        extra.insert(prefer(), HeaderValue::from_static("count=exact"));

        let response = self
            .send(Method::GET, &query.path(), tier, None, extra)
            .await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let text = response.text().await?;
        let rows: Vec<T> = serde_json::from_str(&text)?;
        let total = total.unwrap_or(rows.len() as u64);

        Ok((rows, total))
    }

    pub async fn insert<T, B>(&self, table: &str, body: &B, tier: CredentialTier<'_>) -> Result<T, DbError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<T> = self
            .request_with_headers(
                Method::POST,
                &path,
                tier,
                Some(serde_json::to_value(body)?),
                return_representation(),
            )
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound(format!("insert into {} returned no row", table)))
    }

    /// Patches every row matching `query` and returns the first updated row.
    pub async fn update<T, B>(&self, query: &Query, body: &B, tier: CredentialTier<'_>) -> Result<T, DbError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let rows: Vec<T> = self
            .request_with_headers(
                Method::PATCH,
                &query.mutation_path(),
                tier,
                Some(serde_json::to_value(body)?),
                return_representation(),
            )
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound(format!("no {} row matched", query.table_name())))
    }

    /// Deletes the matching rows. Matching nothing is `DbError::NotFound`.
    pub async fn delete(&self, query: &Query, tier: CredentialTier<'_>) -> Result<(), DbError> {
        let rows: Vec<Value> = self
            .request_with_headers(
                Method::DELETE,
                &query.mutation_path(),
                tier,
                None,
                return_representation(),
            )
            .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound(format!("no {} row matched", query.table_name())));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn prefer() -> HeaderName {
    HeaderName::from_static("prefer")
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(prefer(), HeaderValue::from_static("return=representation"));
    headers
}

fn header_value(raw: &str) -> Result<HeaderValue, DbError> {
    HeaderValue::from_str(raw)
        .map_err(|_| DbError::InvalidRequest("credential contains invalid header characters".to_string()))
}

/// Total from a `Content-Range` header such as `0-19/57` or `*/0`.
pub fn parse_content_range(raw: &str) -> Option<u64> {
    raw.rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}
