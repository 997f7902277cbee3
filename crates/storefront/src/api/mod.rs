//! Madstore REST API client.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared behind an `Arc`, cheap to clone into views
//! - Every request is JSON; responses are read as text and parsed leniently
//! - The API is the source of truth; nothing is cached or retried here
//!
//! # Response handling
//!
//! - Empty body parses to `null`
//! - A body that is not JSON is kept as a JSON string
//! - Non-2xx responses become [`ApiError::Status`] with the message taken from
//!   the payload's `error` field, then `detail`, then the payload itself
//!
//! # Example
//!
//! ```rust,ignore
//! use madstore_storefront::api::ApiClient;
//!
//! let api = ApiClient::new("http://127.0.0.1:8000/");
//! let products = api.products().await?;
//! let cart = api.add_to_cart(&cart_code, products[0].id).await?;
//! ```

mod auth;
mod cart;
mod catalog;
mod orders;
pub mod types;
mod wishlist;

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use types::*;

/// Fallback message when a failed response carries nothing useful.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Errors that can occur when talking to the Madstore API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The response did not have the expected shape.
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The path could not be resolved to a URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The view that issued the request went away.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Human-readable message shown inline in views.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of a failed response, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn decode(endpoint: &str, err: &serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Madstore REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (must end in `/`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into(),
            }),
        }
    }

    /// Base URL every relative path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// Paths starting with `http` are used as is, a leading `/` is dropped and
    /// an empty path resolves to the base URL itself.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the result is not a valid URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        let joined = if path.is_empty() {
            self.inner.base_url.clone()
        } else if path.starts_with("http") {
            path.to_string()
        } else {
            format!(
                "{}{}",
                self.inner.base_url,
                path.strip_prefix('/').unwrap_or(path)
            )
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// `GET` a path and return the parsed payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, HeaderMap::new()).await
    }

    /// `POST` a JSON body (`{}` when `None`).
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let body = body.unwrap_or_else(empty_object);
        self.request(Method::POST, path, Some(&body), HeaderMap::new())
            .await
    }

    /// `PUT` a JSON body (`{}` when `None`).
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let body = body.unwrap_or_else(empty_object);
        self.request(Method::PUT, path, Some(&body), HeaderMap::new())
            .await
    }

    /// `DELETE` a path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, HeaderMap::new())
            .await
    }

    /// Send a request and return the parsed payload.
    ///
    /// `Content-Type: application/json` is always sent; caller headers are
    /// applied afterwards and win on conflict.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] if the path cannot be resolved
    /// - [`ApiError::Transport`] if no response arrives
    /// - [`ApiError::Status`] for non-2xx responses
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        let url = self.resolve(path)?;

        let mut builder = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, error = %e, "Madstore API unreachable");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        // Read as text first so non-JSON bodies survive
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let payload = parse_payload(&text);

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "Madstore API request completed"
        );

        if !status.is_success() {
            let message = error_message(&payload);
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %text.chars().take(500).collect::<String>(),
                "Madstore API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(payload)
    }

    /// `POST` a serializable body.
    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::decode(path, &e))?;
        self.post(path, Some(body)).await
    }

    /// `PUT` a serializable body.
    async fn put_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::decode(path, &e))?;
        self.put(path, Some(body)).await
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

// =============================================================================
// Payload helpers
// =============================================================================

/// Parse a response body: empty → `null`, invalid JSON → the raw text.
#[must_use]
pub fn parse_payload(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Message for a failed response: `error`, then `detail`, then the payload
/// itself, then [`DEFAULT_ERROR_MESSAGE`].
#[must_use]
pub fn error_message(payload: &Value) -> String {
    [payload.get("error"), payload.get("detail"), Some(payload)]
        .into_iter()
        .flatten()
        .find(|value| is_truthy(value))
        .map_or_else(|| DEFAULT_ERROR_MESSAGE.to_string(), value_text)
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a payload, treating `null` as the type's default.
pub(crate) fn decode<T: DeserializeOwned + Default>(
    endpoint: &str,
    payload: Value,
) -> Result<T, ApiError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|e| ApiError::decode(endpoint, &e))
}

/// Decode a list payload; anything that is not an array is an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(
    endpoint: &str,
    payload: Value,
) -> Result<Vec<T>, ApiError> {
    match payload {
        Value::Array(_) => {
            serde_json::from_value(payload).map_err(|e| ApiError::decode(endpoint, &e))
        }
        _ => Ok(Vec::new()),
    }
}

/// Detail endpoints answer with either an object or a one-element array.
pub(crate) fn first_or_self(payload: Value) -> Value {
    match payload {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}

/// Encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
