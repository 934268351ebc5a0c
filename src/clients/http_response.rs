//! Response types.
//!
//! A [`Transport`](crate::clients::Transport) returns an [`HttpResponse`]
//! describing what came back over the wire. The resource then classifies it
//! into a [`Response`], decoding the body into [`ResponseData`] and deciding
//! whether the call failed.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

/// Error text used when the transport produced no status.
pub const CONNECTION_ERROR: &str = "Connection Error";

/// A raw response as reported by a transport.
///
/// `status` is `None` when the transport could not obtain one (for example
/// the connection dropped before headers arrived).
///
/// # Example
///
/// ```rust
/// use rest_resource::HttpResponse;
///
/// let response = HttpResponse::new(404, r#"{"message":"Not Found"}"#)
///     .with_header("Content-Type", "application/json");
///
/// assert_eq!(response.status, Some(404));
/// assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code, if one was received.
    pub status: Option<u16>,
    /// The status text reported by the transport, if any.
    pub status_text: Option<String>,
    /// Response headers keyed by lower-cased name.
    pub headers: HashMap<String, String>,
    /// The raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            status_text: None,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a response that carries no status.
    #[must_use]
    pub fn without_status() -> Self {
        Self::default()
    }

    /// Sets the status text.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
        self
    }

    /// Adds a header. The name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }
}

/// A decoded response body.
///
/// Decoding tries JSON first, then XML, then falls back to the raw text.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseData {
    /// The body parsed as JSON.
    Json(serde_json::Value),
    /// The body is a well-formed XML document, kept as text.
    Xml(String),
    /// The body as received.
    Text(String),
}

impl ResponseData {
    /// Decodes a raw body.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rest_resource::ResponseData;
    ///
    /// assert!(matches!(ResponseData::decode(r#"{"a":1}"#), ResponseData::Json(_)));
    /// assert!(matches!(ResponseData::decode("<a><b/></a>"), ResponseData::Xml(_)));
    /// assert!(matches!(ResponseData::decode("plain"), ResponseData::Text(_)));
    /// ```
    #[must_use]
    pub fn decode(body: &str) -> Self {
        if let Ok(value) = serde_json::from_str(body) {
            return Self::Json(value);
        }
        if is_xml_document(body) {
            return Self::Xml(body.to_string());
        }
        Self::Text(body.to_string())
    }

    /// Returns the JSON value, if the body was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a top-level field of a JSON object body.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.as_json().and_then(|value| value.get(key))
    }

    /// Returns the underlying text for XML and text bodies.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Xml(text) | Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

/// Returns true if `body` parses as an XML document with a root element.
fn is_xml_document(body: &str) -> bool {
    if !body.trim_start().starts_with('<') {
        return false;
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut depth: usize = 0;
    let mut saw_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return saw_element && depth == 0,
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_element = true;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Empty(_)) => saw_element = true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

/// A classified response, delivered with completion events.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The HTTP status code, absent on connection failure.
    pub status: Option<u16>,
    /// The status text reported by the transport, if any.
    pub status_text: Option<String>,
    /// Response headers keyed by lower-cased name.
    pub headers: HashMap<String, String>,
    /// The raw response body.
    pub body: String,
    /// The decoded body.
    pub data: ResponseData,
    /// Error text; present iff the transport failed or the status is absent or >= 400.
    pub error: Option<String>,
}

impl Response {
    /// Classifies a raw transport response.
    ///
    /// When `message_prop` is set and the body is a JSON object holding a
    /// string under that key, the string becomes the error text for
    /// statuses >= 400.
    #[must_use]
    pub fn classify(raw: HttpResponse, message_prop: Option<&str>) -> Self {
        let data = ResponseData::decode(&raw.body);

        // A zero status carries no usable status.
        let status = raw.status.filter(|&status| status != 0);

        let error = match status {
            None => Some(CONNECTION_ERROR.to_string()),
            Some(status) if status >= 400 => Some(
                message_prop
                    .and_then(|prop| data.get(prop))
                    .and_then(serde_json::Value::as_str)
                    .map(String::from)
                    .or_else(|| raw.status_text.clone())
                    .or_else(|| canonical_reason(status).map(String::from))
                    .unwrap_or_else(|| format!("HTTP {status}")),
            ),
            Some(_) => None,
        };

        Self {
            status,
            status_text: raw.status_text,
            headers: raw.headers,
            body: raw.body,
            data,
            error,
        }
    }

    /// Builds the response recorded for a failed transport invocation.
    #[must_use]
    pub fn connection_error() -> Self {
        Self::classify(HttpResponse::without_status(), None)
    }

    /// Returns true when the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the outcome tag: `"success"` or `"error"`.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        if self.is_success() {
            "success"
        } else {
            "error"
        }
    }
}

fn canonical_reason(status: u16) -> Option<&'static str> {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_prefers_json() {
        let data = ResponseData::decode(r#"{"name":"brian"}"#);
        assert_eq!(data, ResponseData::Json(json!({"name": "brian"})));
        assert_eq!(data.get("name"), Some(&json!("brian")));
    }

    #[test]
    fn test_decode_falls_back_to_xml() {
        let body = r#"<?xml version="1.0"?><users><user id="1"/></users>"#;
        assert_eq!(ResponseData::decode(body), ResponseData::Xml(body.to_string()));
    }

    #[test]
    fn test_decode_rejects_unbalanced_xml() {
        let data = ResponseData::decode("<users><user></users>");
        assert!(matches!(data, ResponseData::Text(_)));
    }

    #[test]
    fn test_decode_falls_back_to_text() {
        let data = ResponseData::decode("OK");
        assert_eq!(data.as_text(), Some("OK"));
        assert!(data.as_json().is_none());
    }

    #[test]
    fn test_empty_body_is_text() {
        assert_eq!(ResponseData::decode(""), ResponseData::Text(String::new()));
    }

    #[test]
    fn test_classify_success() {
        let response = Response::classify(HttpResponse::new(200, "{}"), None);
        assert!(response.is_success());
        assert_eq!(response.outcome(), "success");
        assert!(response.error.is_none());
    }

    #[test]
    fn test_classify_missing_status_is_connection_error() {
        let response = Response::classify(HttpResponse::without_status(), None);
        assert_eq!(response.status, None);
        assert_eq!(response.error.as_deref(), Some(CONNECTION_ERROR));
        assert_eq!(response.outcome(), "error");
    }

    #[test]
    fn test_classify_zero_status_is_connection_error() {
        let response = Response::classify(HttpResponse::new(0, ""), None);
        assert_eq!(response.status, None);
        assert_eq!(response.error.as_deref(), Some(CONNECTION_ERROR));
        assert_eq!(response.outcome(), "error");
    }

    #[test]
    fn test_classify_uses_status_text() {
        let raw = HttpResponse::new(500, "boom").with_status_text("Kaboom");
        let response = Response::classify(raw, None);
        assert_eq!(response.error.as_deref(), Some("Kaboom"));
    }

    #[test]
    fn test_classify_uses_canonical_reason_without_status_text() {
        let response = Response::classify(HttpResponse::new(404, ""), None);
        assert_eq!(response.error.as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_classify_prefers_message_prop() {
        let raw = HttpResponse::new(422, r#"{"message":"name is required"}"#)
            .with_status_text("Unprocessable Entity");
        let response = Response::classify(raw, Some("message"));
        assert_eq!(response.error.as_deref(), Some("name is required"));
    }

    #[test]
    fn test_classify_message_prop_ignores_non_string() {
        let raw = HttpResponse::new(400, r#"{"message":{"code":7}}"#);
        let response = Response::classify(raw, Some("message"));
        assert_eq!(response.error.as_deref(), Some("Bad Request"));
    }

    #[test]
    fn test_classify_unknown_status_without_reason() {
        let response = Response::classify(HttpResponse::new(599, ""), None);
        assert_eq!(response.error.as_deref(), Some("HTTP 599"));
    }
}
