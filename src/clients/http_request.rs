//! Request descriptor types.
//!
//! This module provides the [`Request`] descriptor handed to a
//! [`Transport`](crate::clients::Transport), the [`Method`] enum, and the
//! per-call [`CallOptions`] accepted by every resource verb.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP methods a resource can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partially updating resources.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl Method {
    /// Returns the uppercase wire name of this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a method name, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rest_resource::Method;
    ///
    /// assert_eq!(Method::parse("patch"), Some(Method::Patch));
    /// assert_eq!(Method::parse("TRACE"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready for a transport.
///
/// Descriptors are produced by [`Resource`](crate::Resource) verb calls.
/// Listeners registered for `req` events receive a mutable reference and
/// may adjust any field before the transport sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// Normalized path relative to the resource root, without query string.
    pub path: String,
    /// `path` followed by the encoded query string. Used for path-scoped events.
    pub relative_url: String,
    /// The normalized base URL followed by `relative_url`.
    pub url: String,
    /// Merged query parameters (defaults overlaid with call-site values).
    pub query: BTreeMap<String, String>,
    /// Merged headers with lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// The payload exactly as the caller supplied it.
    pub raw_body: Option<serde_json::Value>,
    /// The payload as it goes on the wire.
    pub body: Option<String>,
    /// Serializer output, set only when a serializer ran.
    pub body_serialized: Option<String>,
    /// Response type hint, passed through to the transport untouched.
    pub response_type: Option<String>,
}

impl Request {
    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Options accepted by every resource verb.
///
/// # Example
///
/// ```rust
/// use rest_resource::{CallOptions, Method};
///
/// let options = CallOptions::new()
///     .method(Method::Patch)
///     .query("expand", "owner")
///     .header("X-Request-Id", "abc-123")
///     .serialize(false);
///
/// assert_eq!(options.headers().get("x-request-id").map(String::as_str), Some("abc-123"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOptions {
    method: Option<Method>,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    response_type: Option<String>,
    serialize: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CallOptions {
    /// Creates options with no overrides and serialization enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            method: None,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            response_type: None,
            serialize: true,
        }
    }

    /// Overrides the method parsed from the route.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Adds a query parameter that wins over the resource default.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a header that wins over the resource default. The name is lower-cased.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the response type hint passed through to the transport.
    #[must_use]
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }

    /// Enables or disables body serialization for this call.
    #[must_use]
    pub const fn serialize(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    /// Returns the method override, if any.
    #[must_use]
    pub const fn method_override(&self) -> Option<Method> {
        self.method
    }

    /// Returns the call-site query parameters.
    #[must_use]
    pub const fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Returns the call-site headers (lower-cased names).
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the response type hint, if any.
    #[must_use]
    pub fn response_type_hint(&self) -> Option<&str> {
        self.response_type.as_deref()
    }

    /// Returns whether the body serializer should run.
    #[must_use]
    pub const fn serializes(&self) -> bool {
        self.serialize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display_is_uppercase() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_method_parse_ignores_case() {
        assert_eq!(Method::parse("get"), Some(Method::Get));
        assert_eq!(Method::parse("Delete"), Some(Method::Delete));
        assert_eq!(Method::parse("HEAD"), None);
        assert_eq!(Method::parse(""), None);
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let json = serde_json::to_string(&Method::Patch).unwrap();
        assert_eq!(json, "\"PATCH\"");
    }

    #[test]
    fn test_call_options_defaults() {
        let options = CallOptions::default();
        assert!(options.method_override().is_none());
        assert!(options.query_params().is_empty());
        assert!(options.headers().is_empty());
        assert!(options.response_type_hint().is_none());
        assert!(options.serializes());
    }

    #[test]
    fn test_call_options_lowercases_header_names() {
        let options = CallOptions::new()
            .header("Content-Type", "text/plain")
            .header("X-Trace", "1");

        assert_eq!(
            options.headers().get("content-type"),
            Some(&"text/plain".to_string())
        );
        assert_eq!(options.headers().get("x-trace"), Some(&"1".to_string()));
        assert!(!options.headers().contains_key("X-Trace"));
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let request = Request {
            method: Method::Get,
            path: "/".to_string(),
            relative_url: "/".to_string(),
            url: "/".to_string(),
            query: BTreeMap::new(),
            headers,
            raw_body: None,
            body: None,
            body_serialized: None,
            response_type: None,
        };

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("accept"), None);
    }
}
