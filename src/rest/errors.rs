//! Errors returned synchronously by resource verbs.
//!
//! These are programmer or configuration errors detected while the request
//! is being built, before any event is emitted or the transport is invoked.
//! Network failures and HTTP error statuses are not represented here; they
//! arrive in the [`Completion`](crate::Completion) of the call.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::rest::ResourceError;
//!
//! match users.put(serde_json::json!({"name": "benny"}), None) {
//!     Ok(pending) => { pending.await; }
//!     Err(ResourceError::MissingId { key }) => println!("body has no '{key}'"),
//!     Err(e) => println!("could not build request: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error raised by a body serializer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SerializeError {
    /// What went wrong.
    pub message: String,
}

impl SerializeError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Error type for building a resource call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The body serializer rejected the payload.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] SerializeError),

    /// An object passed to `put`/`patch` has no usable identifier.
    #[error("Body has no string or numeric '{key}' property to use as the resource id.")]
    MissingId {
        /// The id key that was looked up.
        key: String,
    },
}
