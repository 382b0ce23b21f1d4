//! Structured client errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message shown to users when the session could not be renewed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";

/// Categories of client errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorKind {
    /// Connection failure or request timeout
    Transport,
    /// Non-success HTTP status other than a renewal-eligible 401
    HttpStatus,
    /// 401 from the server: the session credential is missing or expired
    Unauthorized,
    /// The session renewal call itself failed
    RefreshFailed,
    /// A request that was already retried after renewal got another 401
    LoopGuard,
    /// Request body could not be encoded or response body could not be decoded
    Parse,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErrorKind::Transport => write!(f, "transport"),
            ClientErrorKind::HttpStatus => write!(f, "http_status"),
            ClientErrorKind::Unauthorized => write!(f, "unauthorized"),
            ClientErrorKind::RefreshFailed => write!(f, "refresh_failed"),
            ClientErrorKind::LoopGuard => write!(f, "loop_guard"),
            ClientErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the request layer with kind and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientError {
    /// Error category
    pub kind: ClientErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ClientError {
    /// Creates a new client error.
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates a transport (connectivity/timeout) error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Parse, message)
    }

    /// Creates an HTTP status error. 401 maps to `Unauthorized`.
    ///
    /// The service reports failures as `{"detail": "..."}`; when present the
    /// detail is lifted into the message.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = if status == 401 {
            ClientErrorKind::Unauthorized
        } else {
            ClientErrorKind::HttpStatus
        };
        let details = (!body.is_empty()).then(|| body.to_string());
        let message = match extract_detail(body) {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind,
            message,
            status: Some(status),
            details,
        }
    }

    /// Wraps the failure of a renewal call.
    pub fn refresh_failed(cause: &ClientError) -> Self {
        Self {
            kind: ClientErrorKind::RefreshFailed,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            status: cause.status,
            details: Some(cause.message.clone()),
        }
    }

    /// A renewal that never settled (its driving task was dropped).
    pub fn refresh_abandoned() -> Self {
        Self {
            kind: ClientErrorKind::RefreshFailed,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            status: None,
            details: Some("session renewal was cancelled before it settled".to_string()),
        }
    }

    /// Wraps a second 401 on a request that was already retried.
    pub fn loop_guard(cause: &ClientError) -> Self {
        Self {
            kind: ClientErrorKind::LoopGuard,
            message: format!("Still unauthorized after session renewal ({})", cause.message),
            status: cause.status,
            details: cause.details.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ClientErrorKind::Unauthorized
    }

    /// True when the user has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self.kind,
            ClientErrorKind::RefreshFailed | ClientErrorKind::LoopGuard
        )
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    match json.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        // Validation errors: [{"loc": [...], "msg": "..."}]
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

/// Result type for request-layer operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Classifies a reqwest error into a `ClientError`.
pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::transport(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ClientError::transport(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ClientError::parse(format!("Failed to read response body: {e}"))
    } else {
        ClientError::transport(format!("Network error: {e}"))
    }
}
