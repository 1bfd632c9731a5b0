//! Shared request wrapper for every console endpoint.
//!
//! # Design
//! `ApiClient` is built once at startup and cloned into each resource client;
//! clones share the transport and notifier through `Arc`. Each call goes
//! through three steps:
//!
//! 1. `build_*` produces an `HttpRequest` rooted at `base_url + base_path`
//!    with a JSON content type and the configured timeout.
//! 2. The `Transport` executes it.
//! 3. `parse` unwraps the `{status, data, message}` envelope into the payload
//!    or an `ApiError`.
//!
//! Any failure along the way is reported to the `Notifier` exactly once
//! before being returned. Successful calls never notify.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::{Envelope, EnvelopeStatus};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::notify::{Notifier, TracingNotifier};
use crate::records::RecordsClient;
use crate::stores::StoresClient;
use crate::tasks::TasksClient;
use crate::transport::{ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_BASE_PATH: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

const CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

/// Where the console backend lives and how long a call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub base_path: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `CONSOLE_API_URL` and `CONSOLE_API_TIMEOUT_MS`, falling back to
    /// the defaults when unset.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("CONSOLE_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url);
        if let Some(raw) = lookup("CONSOLE_API_TIMEOUT_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("CONSOLE_API_TIMEOUT_MS={raw:?}")))?;
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Absolute URL for an endpoint path such as `/get-records`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.base_path, path)
    }
}

/// The configured transport wrapper shared by all resource clients.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client over `reqwest` that reports failures through `tracing`.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_parts(config, Arc::new(ReqwestTransport::new()), Arc::new(TracingNotifier))
    }

    pub fn with_parts(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            transport,
            notifier,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn records(&self) -> RecordsClient {
        RecordsClient::new(self.clone())
    }

    pub fn tasks(&self) -> TasksClient {
        TasksClient::new(self.clone())
    }

    pub fn stores(&self) -> StoresClient {
        StoresClient::new(self.clone())
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    fn build(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: self.config.endpoint(path),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: vec![(CONTENT_TYPE.0.to_string(), CONTENT_TYPE.1.to_string())],
            body,
            timeout: self.config.timeout,
        }
    }

    pub fn build_get(&self, path: &str, query: &[(&str, &str)]) -> HttpRequest {
        self.build(HttpMethod::Get, path, query, None)
    }

    pub fn build_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body.map(encode).transpose()?;
        Ok(self.build(HttpMethod::Post, path, query, body))
    }

    pub fn build_put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body.map(encode).transpose()?;
        Ok(self.build(HttpMethod::Put, path, query, body))
    }

    pub fn build_delete(&self, path: &str, query: &[(&str, &str)]) -> HttpRequest {
        self.build(HttpMethod::Delete, path, query, None)
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    /// Unwrap an envelope into its payload.
    ///
    /// On a 2xx answer any status other than `"success"` is an application
    /// error. An explicit error envelope also wins over a non-2xx status;
    /// any other non-2xx answer becomes `HttpError`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        match Envelope::decode(&response.body) {
            Ok(envelope) if response.is_success() => envelope.into_result(),
            Ok(envelope) if envelope.status == EnvelopeStatus::Error => envelope.into_result(),
            Err(err) if response.is_success() => Err(err),
            _ => Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Execute
    // -----------------------------------------------------------------------

    /// Execute a built request and unwrap its envelope, notifying once on
    /// failure.
    pub async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let method = request.method;
        let url = request.path.clone();
        tracing::debug!(method = method.as_str(), %url, "console api request");

        let result = self.round_trip(request).await;
        if let Err(err) = &result {
            tracing::warn!(method = method.as_str(), %url, error = %err, "console api request failed");
            self.notifier.error(&err.notification_text());
        }
        result
    }

    async fn round_trip<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        request.url()?;
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ApiError::Transport)?;
        self.parse(response)
    }

    /// Run a fallible build step through the same failure reporting as a
    /// round trip.
    pub(crate) async fn send_built<T: DeserializeOwned>(
        &self,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<T, ApiError> {
        match request {
            Ok(request) => self.send(request).await,
            Err(err) => {
                self.notifier.error(&err.notification_text());
                Err(err)
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.send(self.build_get(path, query)).await
    }

    pub async fn post<T, B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_built(self.build_post(path, query, body)).await
    }

    pub async fn put<T, B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_built(self.build_put(path, query, body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.send(self.build_delete(path, query)).await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))
}
