//! Filmes HTTP client.
//!
//! Provides a type-safe client for REST collections of the shape
//! `{base_url}/{resource_path}` and `{base_url}/{resource_path}/{id}`.
//! Authentication is handled by pluggable [`TokenSource`] implementations.
//!
//! # Usage
//!
//! ```ignore
//! use filmes_client::{ResourceClient, StaticToken};
//!
//! let ts = StaticToken::new(access_token);
//! let client = ResourceClient::<MovieRecord>::new("http://localhost:8080", Arc::new(ts));
//! let movies = client.list().await?;
//! ```


use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

// ── Error ───────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

// ── TokenSource ─────────────────────────────────────────────────────

/// Pluggable token provider. Called before every API request.
///
/// Returns `Ok(None)` to skip the Authorization header (anonymous).
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication: anonymous requests.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Static bearer token (already obtained from the identity provider).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        if self.0.is_empty() {
            return Err(ApiError::Auth("empty bearer token".into()));
        }
        Ok(Some(self.0.clone()))
    }
}

// ── Resource ────────────────────────────────────────────────────────

/// A REST collection the client knows how to address.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Collection path segment, e.g. `"filmes"`.
    fn resource_path() -> &'static str;
}

/// Body of a list response.
///
/// The backend is expected to return a JSON array; anything else that is
/// still valid JSON is reported as [`ListPayload::NotAList`] so callers
/// can decide how to normalize it.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload<T> {
    Items(Vec<T>),
    NotAList,
}

impl<T> ListPayload<T> {
    /// Items, with a non-array payload treated as an empty collection.
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Items(items) => items,
            ListPayload::NotAList => Vec::new(),
        }
    }
}

// ── ResourceClient ──────────────────────────────────────────────────

/// Type-safe list/create/delete client for a single [`Resource`].
pub struct ResourceClient<T: Resource> {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
    _phantom: PhantomData<T>,
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
            _phantom: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/{path}`.
    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::resource_path())
    }

    /// `{base_url}/{path}/{id}`.
    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    /// Build a request with auth header.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Map a non-2xx response to `ApiError::Server` carrying the body text.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            debug!(status = code, "request failed");
            return Err(ApiError::Server { status: code, message: body });
        }
        Ok(resp)
    }

    /// List all records.
    pub async fn list(&self) -> Result<ListPayload<T>, ApiError> {
        let url = self.collection_url();
        debug!(%url, "GET");
        let req = self.authed(self.http.get(&url)).await?;
        let resp = Self::check(req.send().await?).await?;
        let body: serde_json::Value = resp.json().await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))?;
        decode_list(body)
    }

    /// Create a new record from a request body; returns the stored record.
    pub async fn create<B: Serialize + ?Sized + Sync>(&self, body: &B) -> Result<T, ApiError> {
        let url = self.collection_url();
        debug!(%url, "POST");
        let req = self.authed(self.http.post(&url).json(body)).await?;
        let resp = Self::check(req.send().await?).await?;
        resp.json::<T>().await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    /// Delete a record by ID.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.item_url(id);
        debug!(%url, "DELETE");
        let req = self.authed(self.http.delete(&url)).await?;
        Self::check(req.send().await?).await?;
        Ok(())
    }
}

/// Decode a list body. Arrays decode element-wise; an element that does
/// not match `T` fails the whole list.
pub fn decode_list<T: DeserializeOwned>(body: serde_json::Value) -> Result<ListPayload<T>, ApiError> {
    match body {
        serde_json::Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                serde_json::from_value(v)
                    .map_err(|e| ApiError::Decode(format!("item {}: {}", i, e)))
            })
            .collect::<Result<Vec<T>, _>>()
            .map(ListPayload::Items),
        _ => Ok(ListPayload::NotAList),
    }
}
