//! The transport seam and the reqwest-backed transport.
//!
//! A [`Resource`](crate::Resource) never talks to the network itself. It
//! builds a [`Request`] descriptor and hands it to a [`Transport`]. Any type
//! implementing the trait can stand in, which is how tests drive resources
//! with canned responses. [`HttpClient`] is the transport used in production.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::clients::errors::TransportError;
use crate::clients::http_request::{Method, Request};
use crate::clients::http_response::HttpResponse;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Performs one HTTP exchange for a descriptor.
///
/// Implementations must not retry, cache, or otherwise alter the request;
/// the resource relies on exactly one exchange per call.
///
/// # Example
///
/// ```rust
/// use rest_resource::{async_trait, HttpResponse, Request, Transport, TransportError};
///
/// #[derive(Debug)]
/// struct Always200;
///
/// #[async_trait]
/// impl Transport for Always200 {
///     async fn send(&self, _request: &Request) -> Result<HttpResponse, TransportError> {
///         Ok(HttpResponse::new(200, "{}"))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends the request and reports what came back.
    async fn send(&self, request: &Request) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a reqwest client.
///
/// Absolute descriptor URLs are requested as-is. Relative URLs (a resource
/// rooted at `/api/users`, say) are resolved against the configured origin.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use rest_resource::HttpClient;
///
/// let client = HttpClient::new()
///     .unwrap()
///     .with_origin("https://api.example.com/");
///
/// assert_eq!(client.origin(), Some("https://api.example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Scheme and authority used to resolve relative URLs.
    origin: Option<String>,
    /// Headers sent with every request unless the descriptor overrides them.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a transport with no origin.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the reqwest client cannot be
    /// created (e.g., TLS initialization failure).
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| TransportError::Client {
                reason: e.to_string(),
            })?;

        let mut default_headers = HashMap::new();
        default_headers.insert(
            "user-agent".to_string(),
            format!("rest-resource v{SDK_VERSION}"),
        );

        Ok(Self {
            client,
            origin: None,
            default_headers,
        })
    }

    /// Sets the origin used to resolve relative URLs. Trailing slashes are dropped.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    /// Returns the configured origin, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolves a descriptor URL to an absolute one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RelativeUrl`] for a relative URL when no
    /// origin is configured.
    pub fn resolve_url(&self, url: &str) -> Result<String, TransportError> {
        if url.contains("://") {
            return Ok(url.to_string());
        }
        match &self.origin {
            Some(origin) if url.starts_with('/') => Ok(format!("{origin}{url}")),
            Some(origin) => Ok(format!("{origin}/{url}")),
            None => Err(TransportError::RelativeUrl {
                url: url.to_string(),
            }),
        }
    }

    /// Flattens reqwest headers into a map keyed by lower-cased name.
    ///
    /// Repeated headers are joined with `", "`.
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default();
            result
                .entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        result
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &Request) -> Result<HttpResponse, TransportError> {
        let url = self.resolve_url(&request.url)?;

        let mut req_builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        for (key, value) in &self.default_headers {
            if !request.headers.contains_key(key) {
                req_builder = req_builder.header(key, value);
            }
        }
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        if let Some(response_type) = &request.response_type {
            tracing::trace!("Response type hint '{}' for {}", response_type, url);
        }

        let res = req_builder.send().await?;

        let status = res.status();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;

        Ok(HttpResponse {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().map(String::from),
            headers,
            body,
        })
    }
}
