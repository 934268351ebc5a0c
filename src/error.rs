//! Configuration error types.
//!
//! [`ResourceConfigBuilder::build`](crate::ResourceConfigBuilder::build)
//! returns `Result<ResourceConfig, ConfigError>` to enable fail-fast
//! validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::{ConfigError, ResourceConfig};
//!
//! let result = ResourceConfig::builder().id_key("").build();
//! assert!(matches!(result, Err(ConfigError::EmptyIdKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring a resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The id key cannot be empty.
    #[error("Id key cannot be empty. Provide the body property that holds the resource id (e.g., 'id').")]
    EmptyIdKey,

    /// A default header name is not a valid HTTP header name.
    #[error("Invalid header name '{name}'. Header names must be non-empty HTTP tokens (e.g., 'x-api-key').")]
    InvalidHeaderName {
        /// The invalid name that was provided.
        name: String,
    },

    /// The message property cannot be empty.
    #[error("Message property cannot be empty. Omit it to use the response status text.")]
    EmptyMessageProp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_key_error_message() {
        let message = ConfigError::EmptyIdKey.to_string();
        assert!(message.contains("Id key cannot be empty"));
    }

    #[test]
    fn test_invalid_header_name_error_message() {
        let error = ConfigError::InvalidHeaderName {
            name: "bad header".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("bad header"));
        assert!(message.contains("HTTP tokens"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyMessageProp;
        let _: &dyn std::error::Error = &error;
    }
}
