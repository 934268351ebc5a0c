//! Request body serialization.
//!
//! A resource runs its serializer on every call that carries a body, unless
//! the call passes `CallOptions::serialize(false)`. The serializer sees the
//! descriptor being built and may adjust it (typically the `content-type`
//! header) before returning the wire payload.

use std::fmt;

use crate::clients::Request;
use crate::rest::errors::SerializeError;

/// Turns a request body into its wire form.
///
/// Closures with the matching signature implement this trait.
///
/// # Example
///
/// ```rust
/// use rest_resource::rest::{BodySerializer, SerializeError};
/// use rest_resource::Request;
///
/// fn form_encode(body: &serde_json::Value, request: &mut Request) -> Result<String, SerializeError> {
///     let object = body
///         .as_object()
///         .ok_or_else(|| SerializeError::new("form bodies must be objects"))?;
///     request
///         .headers
///         .insert("content-type".to_string(), "application/x-www-form-urlencoded".to_string());
///     Ok(object
///         .iter()
///         .map(|(k, v)| format!("{}={}", k, v.as_str().unwrap_or_default()))
///         .collect::<Vec<_>>()
///         .join("&"))
/// }
///
/// let _serializer: &dyn BodySerializer = &form_encode;
/// ```
pub trait BodySerializer: Send + Sync {
    /// Serializes `body`, possibly adjusting `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if the body cannot be encoded. The error
    /// aborts the call before anything is emitted or dispatched.
    fn serialize(&self, body: &serde_json::Value, request: &mut Request)
        -> Result<String, SerializeError>;
}

impl<F> BodySerializer for F
where
    F: Fn(&serde_json::Value, &mut Request) -> Result<String, SerializeError> + Send + Sync,
{
    fn serialize(
        &self,
        body: &serde_json::Value,
        request: &mut Request,
    ) -> Result<String, SerializeError> {
        self(body, request)
    }
}

/// The default serializer: JSON-encodes the body.
///
/// Sets `content-type: application/json` unless the request already has a
/// content type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonSerializer;

impl BodySerializer for JsonSerializer {
    fn serialize(
        &self,
        body: &serde_json::Value,
        request: &mut Request,
    ) -> Result<String, SerializeError> {
        request
            .headers
            .entry("content-type".to_string())
            .or_insert_with(|| "application/json".to_string());
        Ok(serde_json::to_string(body)?)
    }
}

impl fmt::Debug for dyn BodySerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodySerializer")
    }
}

/// Renders a body as text when no serializer runs.
///
/// Strings are sent verbatim; any other value is sent as its JSON text.
#[must_use]
pub fn render_unserialized(body: &serde_json::Value) -> String {
    match body {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Method;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn request() -> Request {
        Request {
            method: Method::Post,
            path: "/".to_string(),
            relative_url: "/".to_string(),
            url: "/api/users/".to_string(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            raw_body: None,
            body: None,
            body_serialized: None,
            response_type: None,
        }
    }

    #[test]
    fn test_json_serializer_sets_content_type() {
        let mut req = request();
        let body = JsonSerializer
            .serialize(&json!({"name": "billiam"}), &mut req)
            .unwrap();

        assert_eq!(body, r#"{"name":"billiam"}"#);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_json_serializer_keeps_existing_content_type() {
        let mut req = request();
        req.headers.insert(
            "content-type".to_string(),
            "application/vnd.api+json".to_string(),
        );
        JsonSerializer.serialize(&json!([1, 2]), &mut req).unwrap();

        assert_eq!(req.header("content-type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_closure_serializer() {
        let upper = |body: &serde_json::Value, _req: &mut Request| -> Result<String, SerializeError> {
            Ok(body.to_string().to_uppercase())
        };
        let mut req = request();
        assert_eq!(upper.serialize(&json!("abc"), &mut req).unwrap(), "\"ABC\"");
    }

    #[test]
    fn test_render_unserialized() {
        assert_eq!(render_unserialized(&json!("raw text")), "raw text");
        assert_eq!(render_unserialized(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(render_unserialized(&json!(42)), "42");
    }
}
