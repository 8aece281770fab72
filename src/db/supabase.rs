//! Supabase remote tier.
//!
//! Talks to PostgREST (`/rest/v1/<table>`) and Storage (`/storage/v1/object`)
//! directly over HTTP. When no credentials are configured a [`DisabledRemote`]
//! is used instead; every call on it fails with `StoreError::RemoteDisabled`,
//! which the data store treats as "fall back to the next tier".

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SupabaseConfig;
use crate::db::error::{StoreError, StoreResult};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// All rows of a table.
    async fn select(&self, table: &str) -> StoreResult<Vec<Value>>;

    /// Insert or update a row by primary key; returns the stored row.
    async fn upsert(&self, table: &str, row: &Value) -> StoreResult<Value>;

    async fn delete(&self, table: &str, id: i64) -> StoreResult<()>;

    /// Upload an object into the configured storage bucket; returns its public URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;
}

/// No-op remote used when Supabase credentials are absent.
pub struct DisabledRemote;

#[async_trait]
impl RemoteStore for DisabledRemote {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn select(&self, _table: &str) -> StoreResult<Vec<Value>> {
        Err(StoreError::RemoteDisabled)
    }

    async fn upsert(&self, _table: &str, _row: &Value) -> StoreResult<Value> {
        Err(StoreError::RemoteDisabled)
    }

    async fn delete(&self, _table: &str, _id: i64) -> StoreResult<()> {
        Err(StoreError::RemoteDisabled)
    }

    async fn upload(
        &self,
        _path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> StoreResult<String> {
        Err(StoreError::RemoteDisabled)
    }
}

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(url: &str, key: &str, bucket: &str, timeout: Duration) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("estate-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Build the remote tier from configuration, falling back to the disabled client.
    pub fn from_config(cfg: &SupabaseConfig) -> Box<dyn RemoteStore> {
        let Some((url, key)) = cfg.credentials() else {
            tracing::warn!(
                "Supabase credentials missing (SUPABASE_URL / SUPABASE_KEY). Using local JSON storage only."
            );
            return Box::new(DisabledRemote);
        };

        match Self::new(
            url,
            key,
            &cfg.storage_bucket,
            Duration::from_secs(cfg.timeout_seconds),
        ) {
            Ok(client) => {
                tracing::info!("Supabase remote store enabled: {}", redact_url(url));
                Box::new(client)
            }
            Err(e) => {
                tracing::warn!("Failed to build Supabase client, using local storage only: {}", e);
                Box::new(DisabledRemote)
            }
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn public_object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            encode_object_path(path)
        )
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn check(resp: reqwest::Response, op: &str) -> StoreResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(StoreError::Remote(format!(
            "Supabase {} failed: {} {}",
            op, status, text
        )))
    }
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn select(&self, table: &str) -> StoreResult<Vec<Value>> {
        let resp = self
            .authorized(self.http.get(self.table_url(table)))
            .query(&[("select", "*")])
            .send()
            .await?;
        let resp = Self::check(resp, &format!("select {}", table)).await?;
        Ok(resp.json().await?)
    }

    async fn upsert(&self, table: &str, row: &Value) -> StoreResult<Value> {
        let resp = self
            .authorized(self.http.post(self.table_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await?;
        let resp = Self::check(resp, &format!("upsert {}", table)).await?;

        // PostgREST returns the affected rows as an array.
        match resp.json::<Value>().await? {
            Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
            Value::Array(_) => Ok(row.clone()),
            other => Ok(other),
        }
    }

    async fn delete(&self, table: &str, id: i64) -> StoreResult<()> {
        let filter = format!("eq.{}", id);
        let resp = self
            .authorized(self.http.delete(self.table_url(table)))
            .query(&[("id", filter.as_str())])
            .send()
            .await?;
        Self::check(resp, &format!("delete {}", table)).await?;
        Ok(())
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_object_path(path)
        );
        let resp = self
            .authorized(self.http.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(resp, "storage upload").await?;
        Ok(self.public_object_url(path))
    }
}

/// Percent-encode each segment of an object path, keeping the `/` separators.
fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip credentials/query from a URL before logging it.
pub fn redact_url(raw: &str) -> String {
    if let Ok(url) = url::Url::parse(raw) {
        let scheme = url.scheme();
        let host = url.host_str().unwrap_or("");
        let port_part = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        format!("{}://{}{}", scheme, host, port_part)
    } else {
        "(redacted)".to_string()
    }
}
