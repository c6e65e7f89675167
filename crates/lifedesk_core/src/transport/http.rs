//! Reqwest-backed transport.
//!
//! # Responsibility
//! - Own HTTP details: URL joining, headers, body encoding, timeouts.
//! - Convert every HTTP or network failure into `ApiError`.

use super::{ApiError, ApiErrorKind, ApiRequest, ApiResult, Method, RequestBody, Transport};
use crate::config::ClientConfig;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Instant;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Transport that talks to one fixed, versioned base endpoint.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds a transport from client configuration.
    ///
    /// # Errors
    /// - Returns a transport error when the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ApiError::transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        // Url::join would drop the `/api/v1` segment when the base lacks a
        // trailing slash, so paths are appended textually.
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|err| ApiError::transport(format!("invalid request url `{joined}`: {err}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let started_at = Instant::now();
        let route = request.route_key();
        let request_id = Uuid::new_v4();
        let url = self.endpoint(&request.path)?;

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=http_request module=transport status=error request_id={} route=\"{}\" duration_ms={} error_code=network error={}",
                    request_id,
                    route,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(ApiError::transport(network_failure_detail(&err)));
            }
        };

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            ApiError::new(
                ApiErrorKind::Transport,
                Some(status.as_u16()),
                format!("failed to read response body: {err}"),
            )
        })?;

        if !status.is_success() {
            let err = ApiError::from_response_body(status.as_u16(), &body);
            warn!(
                "event=http_request module=transport status=error request_id={} route=\"{}\" http_status={} duration_ms={} error_kind={:?}",
                request_id,
                route,
                status.as_u16(),
                started_at.elapsed().as_millis(),
                err.kind
            );
            return Err(err);
        }

        debug!(
            "event=http_request module=transport status=ok request_id={} route=\"{}\" http_status={} duration_ms={}",
            request_id,
            route,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|err| {
            ApiError::new(
                ApiErrorKind::Codec,
                Some(status.as_u16()),
                format!("response body is not valid JSON: {err}"),
            )
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn network_failure_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "could not reach the server".to_string()
    } else {
        format!("request failed: {err}")
    }
}
