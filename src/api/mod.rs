//! Guarded request client.
//!
//! A single shared HTTP client pinned to the API base URL. It carries the
//! current bearer credential and runs every response through the registered
//! [`ResponseGuard`]s before handing the result to the caller.
//!
//! # Failure taxonomy
//!
//! | Outcome | Error |
//! |---|---|
//! | 401 | [`ApiError::Unauthorized`] |
//! | other 4xx | [`ApiError::BadRequest`] |
//! | 5xx | [`ApiError::ServerError`] |
//! | no response | [`ApiError::Network`] |
//!
//! Nothing is retried here. Retry policy, if any, belongs to the caller.

pub mod guard;
pub mod resources;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::multipart;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::shared::config::AppConfig;
use crate::shared::error::ApiError;

pub use guard::{Exchange, GuardHandle, ResponseGuard};
use guard::GuardRegistry;

/// Longest plain-text error body copied into an error message.
const MAX_ERROR_TEXT: usize = 200;

/// Request body.
#[derive(Debug, Clone)]
pub enum Body {
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// `multipart/form-data`
    Multipart(Vec<Upload>),
}

impl Body {
    /// Serialize a value as a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ApiError::invalid_request(format!("cannot encode body: {}", e)))
    }

    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One file part of a multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when a value is present
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client-wide timeout for this call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

struct ClientInner {
    http: Client,
    base_url: Url,
    credential: RwLock<Option<String>>,
    guards: Arc<GuardRegistry>,
}

/// Shared REST client. Cloning is cheap and clones share credential and guards.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a client for the configured API.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::invalid_request(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base_url.clone(),
                credential: RwLock::new(None),
                guards: Arc::new(GuardRegistry::default()),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Attach a bearer credential to every subsequent request.
    ///
    /// Requests already in flight keep the credential they were sent with.
    pub fn set_credential(&self, token: impl Into<String>) {
        let token = token.into();
        *self.credential_slot() = (!token.is_empty()).then_some(token);
    }

    /// Stop sending a bearer credential.
    pub fn clear_credential(&self) {
        *self.credential_slot() = None;
    }

    pub fn credential(&self) -> Option<String> {
        self.inner
            .credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a response guard. It stays registered while the handle lives.
    pub fn register_guard(&self, guard: Arc<dyn ResponseGuard>) -> GuardHandle {
        self.inner.guards.register(guard)
    }

    /// Number of registered guards
    pub fn guard_count(&self) -> usize {
        self.inner.guards.len()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, None, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, body, options).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::PATCH, path, body, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, None, options).await
    }

    /// Perform a request and decode the response body.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` work for
    /// endpoints that answer without content.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let credential = self.credential();
        let request = self.build(method.clone(), url, credential.as_deref(), body, options)?;

        let result = execute(request).await;
        match &result {
            Ok((status, _)) => debug!(%method, path, status = status.as_u16(), "request completed"),
            Err(ApiError::Network { message }) => warn!(%method, path, %message, "request failed without response"),
            Err(err) => debug!(%method, path, status = ?err.status(), "request rejected"),
        }

        self.inner.guards.dispatch(&Exchange {
            method: &method,
            path,
            credential: credential.as_deref(),
            outcome: result.as_ref().map(|(status, _)| *status),
        });

        let (_, bytes) = result?;
        decode(&bytes)
    }

    /// Join a request path onto the base URL, keeping the base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        if path.contains("://") || path.contains('?') || path.contains('#') {
            return Err(ApiError::invalid_request(format!(
                "path must be relative without query: {}",
                path
            )));
        }
        let mut url = self.inner.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        Ok(url)
    }

    fn credential_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.inner
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn build(
        &self,
        method: Method,
        url: Url,
        credential: Option<&str>,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<RequestBuilder, ApiError> {
        let mut request = self.inner.http.request(method, url);

        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::invalid_request(format!("bad header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::invalid_request(format!("bad header value: {}", e)))?;
            request = request.header(name, value);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        request = match body {
            None => request,
            Some(Body::Json(value)) => request.json(&value),
            Some(Body::Form(fields)) => request.form(&fields),
            Some(Body::Multipart(uploads)) => request.multipart(multipart_form(uploads)?),
        };
        Ok(request)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.credential().is_some())
            .finish()
    }
}

async fn execute(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let response = request.send().await.map_err(|e| ApiError::network(e.to_string()))?;
    let status = response.status();

    if status.is_success() {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("failed to read body: {}", e)))?;
        return Ok((status, bytes.to_vec()));
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_detail(&text)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(ApiError::from_status(status, message))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(serde_json::Value::Null).map_err(ApiError::from);
    }
    serde_json::from_slice(bytes).map_err(ApiError::from)
}

fn multipart_form(uploads: Vec<Upload>) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new();
    for upload in uploads {
        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ApiError::invalid_request(format!("bad content type: {}", e)))?;
        }
        form = form.part(upload.field, part);
    }
    Ok(form)
}

/// Pull a readable message out of an error body.
///
/// Understands `{"detail": "..."}`, the validation list shape
/// `{"detail": [{"msg": "..."}]}` and `{"message": "..."}`; short plain-text
/// bodies are used as they are.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let detail = value.get("detail").or_else(|| value.get("message"))?;
        return match detail {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            other => Some(other.to_string()),
        };
    }

    (trimmed.len() <= MAX_ERROR_TEXT).then(|| trimmed.to_string())
}
