//! Single-shot HTTP transport bound to a base origin.
//!
//! Credentials ride exclusively on the cookie store attached to the
//! underlying `reqwest::Client`; nothing here sets auth headers by hand.
//! Retries live in the dispatcher, never here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ClientError, ClientResult, classify_reqwest_error};
use crate::session::SessionJar;

/// Standard User-Agent header for taskdeck API requests.
pub const USER_AGENT: &str = concat!("taskdeck/", env!("CARGO_PKG_VERSION"));

/// A fully-formed request, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/tasks/3`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    /// Returns a parse error if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::parse(format!("Failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    /// Returns a parse error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::parse(format!("Failed to decode response body: {e}")))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues exactly one HTTP call per `send`.
///
/// Non-2xx answers come back as `Err` with the status attached; a 401 is
/// `ClientErrorKind::Unauthorized`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = ClientResult<ApiResponse>> + Send;
}

/// Transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    /// Per-request timeout (None disables)
    pub request_timeout: Option<Duration>,
}

/// reqwest-backed transport with a cookie-carrying client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose client reads and writes cookies via `jar`.
    ///
    /// # Errors
    /// Returns a transport error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &TransportConfig, jar: Arc<SessionJar>) -> ClientResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            ClientError::transport(format!("Invalid base URL {}: {e}", config.base_url))
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(jar);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let url = self.url_for(&request.path);
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %url, "request failed");
            let text = String::from_utf8_lossy(&body);
            return Err(ClientError::http_status(status.as_u16(), &text));
        }

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
