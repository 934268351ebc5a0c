//! Configuration types for resources.
//!
//! Most resources only need [`Resource::new`](crate::Resource::new). When a
//! resource should start out with default parameters, headers, a different
//! id key, or a custom serializer, build a [`ResourceConfig`] first and pass
//! it to [`Resource::from_config`](crate::Resource::from_config).
//!
//! # Example
//!
//! ```rust
//! use rest_resource::ResourceConfig;
//!
//! let config = ResourceConfig::builder()
//!     .url("https://api.example.com/v1/users")
//!     .id_key("uuid")
//!     .message_prop("message")
//!     .param("api_key", "k-123")
//!     .header("Accept", "application/json")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.id_key(), "uuid");
//! assert_eq!(config.headers().get("accept").map(String::as_str), Some("application/json"));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::HeaderName;

use crate::error::ConfigError;
use crate::rest::{BodySerializer, JsonSerializer};

/// Default base URL for a resource.
pub const DEFAULT_URL: &str = "/";

/// Default body property holding a resource's identifier.
pub const DEFAULT_ID_KEY: &str = "id";

/// Initial configuration for a [`Resource`](crate::Resource).
///
/// Each resource copies the maps at construction, so one config can seed
/// many resources without them sharing state.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    url: String,
    id_key: String,
    message_prop: Option<String>,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    serializer: Option<Arc<dyn BodySerializer>>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            id_key: DEFAULT_ID_KEY.to_string(),
            message_prop: None,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            serializer: Some(Arc::new(JsonSerializer)),
        }
    }
}

impl ResourceConfig {
    /// Creates a new builder for constructing a `ResourceConfig`.
    #[must_use]
    pub fn builder() -> ResourceConfigBuilder {
        ResourceConfigBuilder::new()
    }

    /// Returns the base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the id key.
    #[must_use]
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Returns the response property used as error text, if configured.
    #[must_use]
    pub fn message_prop(&self) -> Option<&str> {
        self.message_prop.as_deref()
    }

    /// Returns the default query parameters.
    #[must_use]
    pub const fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Returns the default headers (lower-cased names).
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the body serializer, if any.
    #[must_use]
    pub fn serializer(&self) -> Option<&Arc<dyn BodySerializer>> {
        self.serializer.as_ref()
    }
}

// Verify ResourceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceConfig>();
};

/// Builder for constructing [`ResourceConfig`] instances.
///
/// # Defaults
///
/// - `url`: `"/"`
/// - `id_key`: `"id"`
/// - `message_prop`: `None`
/// - `param`/`header`: empty
/// - serializer: [`JsonSerializer`]
#[derive(Debug)]
pub struct ResourceConfigBuilder {
    url: Option<String>,
    id_key: Option<String>,
    message_prop: Option<String>,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    serializer: Option<Arc<dyn BodySerializer>>,
}

impl Default for ResourceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: None,
            id_key: None,
            message_prop: None,
            query: BTreeMap::new(),
            headers: Vec::new(),
            serializer: Some(Arc::new(JsonSerializer)),
        }
    }

    /// Sets the base URL. An empty URL means `"/"`.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the body property read by `put`/`patch` when given a bare object.
    #[must_use]
    pub fn id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = Some(id_key.into());
        self
    }

    /// Sets the JSON response property used as error text for failed statuses.
    #[must_use]
    pub fn message_prop(mut self, prop: impl Into<String>) -> Self {
        self.message_prop = Some(prop.into());
        self
    }

    /// Adds a default query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a default header. The name is validated and lower-cased by [`build`](Self::build).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body serializer.
    #[must_use]
    pub fn serializer(mut self, serializer: impl BodySerializer + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Disables body serialization; bodies are sent as rendered text.
    #[must_use]
    pub fn without_serializer(mut self) -> Self {
        self.serializer = None;
        self
    }

    /// Builds the [`ResourceConfig`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyIdKey`] if the id key is empty,
    /// [`ConfigError::EmptyMessageProp`] if the message property is empty, and
    /// [`ConfigError::InvalidHeaderName`] if a header name is not a valid
    /// HTTP header name.
    pub fn build(self) -> Result<ResourceConfig, ConfigError> {
        let id_key = self.id_key.unwrap_or_else(|| DEFAULT_ID_KEY.to_string());
        validate_id_key(&id_key)?;

        if let Some(prop) = &self.message_prop {
            validate_message_prop(prop)?;
        }

        let mut headers = BTreeMap::new();
        for (name, value) in self.headers {
            headers.insert(header_key(&name)?, value);
        }

        let url = self
            .url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        Ok(ResourceConfig {
            url,
            id_key,
            message_prop: self.message_prop,
            query: self.query,
            headers,
            serializer: self.serializer,
        })
    }
}

/// Rejects an empty id key.
pub(crate) fn validate_id_key(id_key: &str) -> Result<(), ConfigError> {
    if id_key.is_empty() {
        return Err(ConfigError::EmptyIdKey);
    }
    Ok(())
}

/// Rejects an empty message property.
pub(crate) fn validate_message_prop(prop: &str) -> Result<(), ConfigError> {
    if prop.is_empty() {
        return Err(ConfigError::EmptyMessageProp);
    }
    Ok(())
}

/// Validates a header name and returns its lower-cased map key.
pub(crate) fn header_key(name: &str) -> Result<String, ConfigError> {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        return Err(ConfigError::InvalidHeaderName {
            name: name.to_string(),
        });
    }
    Ok(name.to_ascii_lowercase())
}
