//! Error types for the contacts API client.
//!
//! # Design
//! Every failure is terminal for the operation that triggered it; nothing in
//! the core retries. The `Display` text of each variant is what ends up in a
//! flash banner, so `Http` renders the server's body verbatim and falls back
//! to the status line only when the body is empty.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the client core and by host transports.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Client-side pre-flight check failed; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status.
    #[error("{}", http_message(.status, .reason, .body))]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// The round-trip did not finish before the transport's deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The configured base URL cannot carry the requested path.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The session flag could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),

    /// Admin password mismatch.
    #[error("Wrong password")]
    Unauthorized,
}

fn http_message(status: &u16, reason: &str, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}

impl ApiError {
    /// Status code carried by an HTTP failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Display text, or `fallback` when the error renders as an empty string.
    pub fn message_or(&self, fallback: &str) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            fallback.to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_body_text() {
        let err = ApiError::Http {
            status: 400,
            reason: "Bad Request".to_string(),
            body: "phoneNumber must not be blank".to_string(),
        };
        assert_eq!(err.to_string(), "phoneNumber must not be blank");
    }

    #[test]
    fn http_error_falls_back_to_status_line() {
        let err = ApiError::Http {
            status: 502,
            reason: "Bad Gateway".to_string(),
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn timeout_mentions_duration() {
        let err = ApiError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "request timed out after 30s");
    }

    #[test]
    fn message_or_uses_fallback_for_empty_validation() {
        let err = ApiError::Validation(String::new());
        assert_eq!(err.message_or("Failed to load"), "Failed to load");
    }
}
