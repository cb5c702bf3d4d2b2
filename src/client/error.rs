//! Error types for upstream calls.

use reqwest::StatusCode;

/// Failure of a single Global API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobalApiError {
    /// A caller-supplied field is missing or blank. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Upstream rejected the request (HTTP 4xx).
    #[error("upstream rejected the request (status {status}): {message}")]
    UpstreamClientError { status: u16, message: String },

    /// Transport failure, timeout, upstream 5xx or an undecodable body.
    #[error("upstream unavailable{}: {}", status_suffix(.status), .message)]
    UpstreamUnavailable { status: Option<u16>, message: String },
}

impl GlobalApiError {
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument(detail.into())
    }

    /// HTTP status reported by upstream, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::UpstreamClientError { status, .. } => Some(*status),
            Self::UpstreamUnavailable { status, .. } => *status,
        }
    }

    /// Classify a non-success upstream response.
    ///
    /// 4xx is the caller's fault; everything else is treated as the upstream
    /// being unavailable.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = upstream_message(status, body);
        if status.is_client_error() {
            Self::UpstreamClientError {
                status: status.as_u16(),
                message,
            }
        } else {
            Self::UpstreamUnavailable {
                status: Some(status.as_u16()),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for GlobalApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else if err.is_decode() {
            format!("invalid response body: {err}")
        } else {
            err.to_string()
        };
        Self::UpstreamUnavailable {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Pull the human readable message out of an upstream error body.
///
/// Prefers `detail`, `message` or `error` from a JSON body, then the raw
/// text, then the status reason phrase.
fn upstream_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match map.get(key) {
                Some(serde_json::Value::String(s)) => {
                    if !s.is_empty() {
                        return s.clone();
                    }
                }
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
