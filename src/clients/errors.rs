//! Transport error types.
//!
//! A [`TransportError`] never reaches the caller as an `Err`. The resource
//! logs it and records the call as a connection error, so it surfaces only
//! through completion events and the [`Completion`](crate::Completion).

use thiserror::Error;

/// Errors a transport can report instead of a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client failed (connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The descriptor URL is relative and the transport has no origin to resolve it against.
    #[error("Cannot send request to relative URL '{url}' without an origin. Configure one with HttpClient::with_origin.")]
    RelativeUrl {
        /// The unresolved URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {reason}")]
    Client {
        /// Why construction failed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_url_error_message() {
        let error = TransportError::RelativeUrl {
            url: "/api/users".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/api/users"));
        assert!(message.contains("with_origin"));
    }

    #[test]
    fn test_client_error_message() {
        let error = TransportError::Client {
            reason: "no TLS backend".to_string(),
        };
        assert!(error.to_string().contains("no TLS backend"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = TransportError::RelativeUrl {
            url: "/".to_string(),
        };
        let _: &dyn std::error::Error = &error;
    }
}
