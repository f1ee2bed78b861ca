//! Backend API error types.
//!
//! Every failure the workflow can surface falls into one of five kinds. The kind decides
//! how the caller reacts:
//!
//! - **Validation**: bad input; shown inline, the user corrects it and resubmits
//! - **NotFound**: missing tournament or profile; the user is prompted to navigate
//! - **Auth**: expired or missing token; the user is sent back to the identity flow
//! - **Network**: transient; shown inline, the user may retry the same action
//! - **Conflict**: a duplicate submission; the client-side guard blocks it silently
//!
//! Nothing is retried automatically. Every retry is a user-initiated resubmission.

use std::fmt;
use thiserror::Error;

/// The kind of API error, categorized for user-facing handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Bad input (HTTP 400, 422, or rejected client-side).
    Validation,

    /// The requested record does not exist (HTTP 404).
    NotFound,

    /// Missing, expired, or insufficient credentials (HTTP 401, 403).
    Auth,

    /// Transport failure, timeout, server error, or an unreadable response.
    Network,

    /// The operation was already performed (HTTP 409 or the client-side guard).
    Conflict,
}

impl ApiErrorKind {
    /// Returns true if resubmitting the same action may succeed.
    pub fn is_user_retryable(&self) -> bool {
        matches!(self, ApiErrorKind::Network)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiErrorKind::Validation => "validation",
            ApiErrorKind::NotFound => "not found",
            ApiErrorKind::Auth => "auth",
            ApiErrorKind::Network => "network",
            ApiErrorKind::Conflict => "conflict",
        };
        f.write_str(s)
    }
}

/// Classifies an HTTP status code.
///
/// Only meaningful for non-success statuses.
pub fn classify_status(status: u16) -> ApiErrorKind {
    match status {
        400 | 422 => ApiErrorKind::Validation,
        401 | 403 => ApiErrorKind::Auth,
        404 => ApiErrorKind::NotFound,
        409 => ApiErrorKind::Conflict,
        408 | 429 => ApiErrorKind::Network,
        code if (500..600).contains(&code) => ApiErrorKind::Network,
        // Other 4xx are client mistakes the user can only fix by changing input.
        _ => ApiErrorKind::Validation,
    }
}

/// A backend API error with categorization for user-facing handling.
#[derive(Debug, Error)]
pub struct ApiError {
    pub kind: ApiErrorKind,

    /// The HTTP status code, if the backend answered.
    pub status_code: Option<u16>,

    /// A human-readable description, taken from the backend's `detail` when present.
    pub message: String,

    /// The underlying transport error, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "API error (HTTP {}): {}", code, self.message),
            None => write!(f, "API error: {}", self.message),
        }
    }
}

impl ApiError {
    fn without_source(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::without_source(ApiErrorKind::Validation, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::without_source(ApiErrorKind::Auth, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::without_source(ApiErrorKind::Network, message)
    }

    /// Creates an error from a non-success HTTP status and the backend's detail message.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let kind = classify_status(status);
        ApiError {
            kind,
            status_code: Some(status),
            message: detail.unwrap_or_else(|| default_message(kind).to_string()),
            source: None,
        }
    }

    /// Categorizes a transport-level reqwest error.
    ///
    /// Errors carrying a status code are classified by it; everything else (connect
    /// failures, timeouts, undecodable bodies) is treated as a network error.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = status_code
            .map(classify_status)
            .unwrap_or(ApiErrorKind::Network);
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_decode() {
            "unreadable response from server".to_string()
        } else {
            err.to_string()
        };
        ApiError {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// The interpreter answered an effect with the wrong response variant.
    pub fn unexpected_response(expected: &str, got: &str) -> Self {
        Self::network(format!(
            "unexpected response: expected {}, got {}",
            expected, got
        ))
    }
}

fn default_message(kind: ApiErrorKind) -> &'static str {
    match kind {
        ApiErrorKind::Validation => "the request was rejected",
        ApiErrorKind::NotFound => "not found",
        ApiErrorKind::Auth => "not signed in or session expired",
        ApiErrorKind::Network => "the server is unavailable, please try again",
        ApiErrorKind::Conflict => "already exists",
    }
}

/// Extracts the `detail` message from a FastAPI-style error body.
///
/// `detail` is usually a string; validation failures carry a list of objects with a
/// `msg` field, which are joined.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
