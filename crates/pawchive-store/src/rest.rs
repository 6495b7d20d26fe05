//! REST backend following PostgREST and storage API conventions
//!
//! ```text
//! GET    {url}/rest/v1/{table}?select=..&order=created_at.desc&limit=N
//! POST   {url}/rest/v1/{table}                     (Prefer: return=representation)
//! PATCH  {url}/rest/v1/{table}?id=eq.{id}
//! DELETE {url}/rest/v1/{table}?id=eq.{id}
//! POST   {url}/storage/v1/object/{bucket}/{object}
//!        {url}/storage/v1/object/public/{bucket}/{object}
//! ```

use crate::config::BackendConfig;
use crate::error::StoreError;
use crate::query::SelectQuery;
use crate::source::{BlobStorage, StrayMutation, StrayQuery};
use async_trait::async_trait;
use pawchive_model::{StrayDraft, StrayId, StrayRecord};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;

/// Error body returned by PostgREST and the storage API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP client for a hosted backend
#[derive(Debug, Clone)]
pub struct RestBackend {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - `StoreError::Config` if the configuration is invalid or the client
    ///   cannot be built
    pub fn new(config: &BackendConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| StoreError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
        })
    }

    /// Base URL without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Table endpoint
    #[must_use]
    pub fn table_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    /// Object upload endpoint
    #[must_use]
    pub fn object_url(&self, bucket: &str, object: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object)
    }

    /// Query string for a select
    #[must_use]
    pub fn select_params(query: &SelectQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", query.field_list()),
            ("order", query.order.to_param()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }

    /// Row filter for a single id
    #[must_use]
    pub fn id_filter(id: &StrayId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn checked(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);
        Err(StoreError::backend(status.as_u16(), message))
    }

    async fn rows(request: RequestBuilder) -> Result<Vec<StrayRecord>, StoreError> {
        let response = Self::checked(request.send().await?).await?;
        Ok(response.json::<Vec<StrayRecord>>().await?)
    }
}

#[async_trait]
impl StrayQuery for RestBackend {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<StrayRecord>, StoreError> {
        tracing::debug!(collection = %query.collection, limit = ?query.limit, "select");
        let request = self
            .authorized(self.http.get(self.table_url(&query.collection)))
            .query(&Self::select_params(query));
        Self::rows(request).await
    }
}

#[async_trait]
impl StrayMutation for RestBackend {
    async fn insert(
        &self,
        collection: &str,
        draft: &StrayDraft,
    ) -> Result<StrayRecord, StoreError> {
        let draft = draft.clone().validate()?;
        let request = self
            .authorized(self.http.post(self.table_url(collection)))
            .header("Prefer", "return=representation")
            .json(&draft);

        Self::rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        collection: &str,
        id: &StrayId,
        draft: &StrayDraft,
    ) -> Result<StrayRecord, StoreError> {
        let draft = draft.clone().validate()?;
        let request = self
            .authorized(self.http.patch(self.table_url(collection)))
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation")
            .json(&draft);

        Self::rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn delete(&self, collection: &str, id: &StrayId) -> Result<(), StoreError> {
        let request = self
            .authorized(self.http.delete(self.table_url(collection)))
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation");

        if Self::rows(request).await?.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStorage for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let request = self
            .authorized(self.http.post(self.object_url(bucket, object)))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        Self::checked(request.send().await?).await?;
        tracing::info!(bucket, object, "photo uploaded");
        Ok(format!("{bucket}/{object}"))
    }

    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, object
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backend() -> RestBackend {
        RestBackend::new(
            &BackendConfig::new()
                .with_url("https://demo.example.co/")
                .with_anon_key("anon"),
        )
        .unwrap()
    }

    #[test]
    fn urls_drop_trailing_slash() {
        let rest = backend();
        assert_eq!(rest.base_url(), "https://demo.example.co");
        assert_eq!(
            rest.table_url("strays"),
            "https://demo.example.co/rest/v1/strays"
        );
        assert_eq!(
            rest.public_url("stray-photos", "1700000000000-charlie.jpg"),
            "https://demo.example.co/storage/v1/object/public/stray-photos/1700000000000-charlie.jpg"
        );
        assert_eq!(
            rest.object_url("stray-photos", "a.png"),
            "https://demo.example.co/storage/v1/object/stray-photos/a.png"
        );
    }

    #[test]
    fn select_params_follow_postgrest() {
        let query = SelectQuery::newest_first("strays")
            .with_fields(["id", "name", "status", "location"])
            .with_limit(Some(20));

        assert_eq!(
            RestBackend::select_params(&query),
            vec![
                ("select", "id,name,status,location".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", "20".to_string()),
            ]
        );
        assert_eq!(
            RestBackend::id_filter(&StrayId::new("12")),
            [("id", "eq.12".to_string())]
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = RestBackend::new(&BackendConfig::new()).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn error_body_accepts_message_or_error() {
        let a: ErrorBody = serde_json::from_str(r#"{"message": "JWT expired"}"#).unwrap();
        let b: ErrorBody =
            serde_json::from_str(r#"{"statusCode": "404", "error": "Bucket not found"}"#).unwrap();
        assert_eq!(a.message.as_deref(), Some("JWT expired"));
        assert_eq!(b.message.or(b.error).as_deref(), Some("Bucket not found"));
    }
}
