//! REST transport boundary.
//!
//! # Responsibility
//! - Describe backend calls as plain `ApiRequest` values.
//! - Execute them through a swappable `Transport` implementation.
//! - Decode typed responses and normalize every failure into `ApiError`.
//!
//! # Invariants
//! - Transport never touches session state; tokens are passed per request.
//! - Bearer tokens never appear in `Debug` output or log lines.

mod client;
mod error;
mod http;

pub use client::{AccessToken, ApiClient, Credentials};
pub use error::{detail_from_body, ApiError, ApiErrorKind, ApiResult, GENERIC_FAILURE_MESSAGE};
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Debug, Formatter};

/// HTTP verbs used by the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Encoded request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded`; only login uses this.
    Form(Vec<(String, String)>),
}

/// One backend call, relative to the configured base endpoint.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base endpoint, always starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serializes `body` as the JSON payload.
    ///
    /// # Errors
    /// - Returns `ApiErrorKind::Codec` when `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::codec(format!("failed to encode request body: {err}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `METHOD /path?query` without credentials, for logs and test routing.
    pub fn route_key(&self) -> String {
        if self.query.is_empty() {
            return format!("{} {}", self.method.as_str(), self.path);
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {}?{}", self.method.as_str(), self.path, query)
    }
}

impl Debug for ApiRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Executes one request and returns the decoded JSON body.
///
/// Implementations map every failure, including network absence, into
/// `ApiError`. A successful response with an empty body yields `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value>;
}
