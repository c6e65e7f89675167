//! Uniform failure shape for every backend call.
//!
//! # Invariants
//! - Callers of the transport layer handle exactly one error type.
//! - `detail` carries the server-provided message when one exists.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message shown for failures the user cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Please try again later";

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure category used for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Server rejected the request with a 4xx and a `detail` message,
    /// or local pre-flight validation failed.
    Validation,
    /// 401/403: missing, expired or invalid bearer token.
    Authentication,
    /// No response, timeout, or an error body that is not JSON.
    Transport,
    /// Response (or request body) did not match the expected schema.
    Codec,
    /// An authenticated call was attempted while the session is anonymous.
    NotSignedIn,
}

/// Structured API failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    pub detail: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            detail: detail.into(),
        }
    }

    /// Local validation failure; no request was sent.
    pub fn local(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, None, detail)
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, detail)
    }

    pub fn codec(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Codec, None, detail)
    }

    pub fn not_signed_in() -> Self {
        Self::new(ApiErrorKind::NotSignedIn, None, "not signed in")
    }

    /// Maps a non-success status plus its decoded `detail` message.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ApiErrorKind::Authentication,
            _ => ApiErrorKind::Validation,
        };
        Self::new(kind, Some(status), detail)
    }

    /// Builds an error from a non-success response body.
    ///
    /// Bodies that are not JSON collapse into a transport failure that keeps
    /// the status for diagnostics.
    pub fn from_response_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => {
                let detail = detail_from_body(&value)
                    .unwrap_or_else(|| format!("request failed with status {status}"));
                Self::from_status(status, detail)
            }
            Err(_) => Self::new(
                ApiErrorKind::Transport,
                Some(status),
                format!("request failed with status {status}"),
            ),
        }
    }

    pub fn is_authentication(&self) -> bool {
        self.kind == ApiErrorKind::Authentication
    }

    /// Text a view shows in its notification.
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Validation | ApiErrorKind::Authentication => self.detail.clone(),
            ApiErrorKind::NotSignedIn => "Please sign in to continue".to_string(),
            ApiErrorKind::Transport | ApiErrorKind::Codec => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} error (status {status}): {}", self.kind, self.detail),
            None => write!(f, "{:?} error: {}", self.kind, self.detail),
        }
    }
}

impl Error for ApiError {}

/// Extracts the server `detail` message.
///
/// Accepts a plain string or a list of validation items with `msg` fields.
pub fn detail_from_body(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let messages = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{detail_from_body, ApiError, ApiErrorKind, GENERIC_FAILURE_MESSAGE};
    use serde_json::json;

    #[test]
    fn string_detail_is_surfaced_verbatim() {
        let err = ApiError::from_response_body(400, br#"{"detail":"Email already registered"}"#);
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let err = ApiError::from_response_body(401, br#"{"detail":"Could not validate credentials"}"#);
        assert!(err.is_authentication());
        assert_eq!(err.user_message(), "Could not validate credentials");
    }

    #[test]
    fn non_json_error_body_is_transport_failure() {
        let err = ApiError::from_response_body(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.status, Some(502));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn validation_item_list_is_joined() {
        let body = json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address"},
                {"loc": ["body", "age"], "msg": "value is not a valid integer"}
            ]
        });
        assert_eq!(
            detail_from_body(&body).as_deref(),
            Some("value is not a valid email address; value is not a valid integer")
        );
    }

    #[test]
    fn missing_detail_falls_back_to_status_message() {
        let err = ApiError::from_response_body(404, br#"{"error":"nope"}"#);
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.detail, "request failed with status 404");
    }
}
