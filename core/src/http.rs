//! HTTP transport types for the console API.
//!
//! # Design
//! Requests and responses are plain data. Resource clients build an
//! `HttpRequest`, a `Transport` executes it, and the resulting `HttpResponse`
//! is handed back to `ApiClient::parse` for envelope unwrapping. Keeping the
//! build and parse steps free of I/O makes every endpoint testable without a
//! network.

use std::time::Duration;

use url::Url;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute endpoint URL without the query string; the query
/// pairs are kept separately so callers can inspect them unencoded.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Look up a query parameter by key.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full URL with the query pairs form-encoded.
    pub fn url(&self) -> Result<Url, ApiError> {
        let url = if self.query.is_empty() {
            Url::parse(&self.path)
        } else {
            Url::parse_with_params(&self.path, &self.query)
        };
        url.map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.path)))
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
