//! The [`Resource`] client.
//!
//! A resource represents one REST collection rooted at a base URL. Its verbs
//! (`index`, `get`, `post`, `put`, `patch`, `del`) turn a terse call into a
//! fully built [`Request`], emit `req` events, and hand back a
//! [`PendingCall`]. Awaiting the pending call invokes the transport once,
//! emits the completion events, and yields a [`Completion`].
//!
//! # Call lifecycle
//!
//! 1. The verb builds the descriptor: method, normalized path, merged query
//!    and headers, composed URL, serialized body.
//! 2. `req` and `req:<relative_url>` are emitted. Listeners may edit the
//!    descriptor.
//! 3. The verb returns. Serializer failures surface here as `Err`.
//! 4. Awaiting the [`PendingCall`] sends the request. On completion the
//!    resource emits, in order: `status`, `status:<code>`, `res`,
//!    `res:<relative_url>`, `success`/`error`, and
//!    `success:<relative_url>`/`error:<relative_url>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::{HttpClient, Resource};
//! use serde_json::json;
//!
//! let transport = HttpClient::new()?.with_origin("http://localhost:3000");
//! let mut users = Resource::new("/api/users", transport);
//! users.set_param("auth_token", "asdf1234");
//!
//! users.on("error", |event| eprintln!("failed: {}", event.request().url));
//!
//! let created = users.post(json!({"name": "billiam"}), None)?.await;
//! let fetched = users.get(42, None)?.await;
//! if let Some(error) = fetched.error() {
//!     println!("lookup failed: {error}");
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use crate::clients::{CallOptions, Method, Request, Response, ResponseData, Transport};
use crate::config::{header_key, validate_id_key, validate_message_prop, ResourceConfig};
use crate::error::ConfigError;
use crate::rest::errors::ResourceError;
use crate::rest::events::{Event, EventBus, Listener};
use crate::rest::path::{compose_url, parse_route, query_string};
use crate::rest::serialize::{render_unserialized, BodySerializer};

/// The target of a `put` or `patch`.
///
/// Both call shapes normalize here: an explicit id with a body, or a bare
/// JSON object whose id is read from the resource's id key.
///
/// # Example
///
/// ```rust
/// use rest_resource::UpdateTarget;
/// use serde_json::json;
///
/// let explicit: UpdateTarget = (7, json!({"name": "benny"})).into();
/// let implied: UpdateTarget = json!({"id": 7, "name": "benny"}).into();
///
/// assert_eq!(explicit.resolve("id").unwrap().0, "7");
/// assert_eq!(implied.resolve("id").unwrap().0, "7");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateTarget {
    /// An explicit id and body.
    Id {
        /// The resource id, already rendered for the path.
        id: String,
        /// The payload.
        body: serde_json::Value,
    },
    /// A body carrying its own id.
    Object(serde_json::Value),
}

impl UpdateTarget {
    /// Resolves the id and body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] when an object target has no
    /// string or numeric value under `id_key`.
    pub fn resolve(self, id_key: &str) -> Result<(String, serde_json::Value), ResourceError> {
        match self {
            Self::Id { id, body } => Ok((id, body)),
            Self::Object(body) => {
                let id = match body.get(id_key) {
                    Some(serde_json::Value::String(id)) => id.clone(),
                    Some(serde_json::Value::Number(id)) => id.to_string(),
                    _ => {
                        return Err(ResourceError::MissingId {
                            key: id_key.to_string(),
                        })
                    }
                };
                Ok((id, body))
            }
        }
    }
}

impl From<serde_json::Value> for UpdateTarget {
    fn from(body: serde_json::Value) -> Self {
        Self::Object(body)
    }
}

impl<I: fmt::Display> From<(I, serde_json::Value)> for UpdateTarget {
    fn from((id, body): (I, serde_json::Value)) -> Self {
        Self::Id {
            id: id.to_string(),
            body,
        }
    }
}

/// The finished call: the request as dispatched and its classified response.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    /// The request as it was handed to the transport.
    pub request: Request,
    /// The classified response.
    pub response: Response,
}

impl Completion {
    /// Returns the error text, if the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.response.error.as_deref()
    }

    /// Returns the decoded response body.
    #[must_use]
    pub const fn data(&self) -> &ResponseData {
        &self.response.data
    }

    /// Returns the status code, absent on connection failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.response.status
    }

    /// Returns true when the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.response.is_success()
    }
}

/// A built request whose `req` events have fired, waiting to be sent.
///
/// Await it (it implements [`IntoFuture`]) or [`spawn`](Self::spawn) it to
/// perform the single transport invocation. Dropping it without either
/// sends nothing.
#[must_use = "a pending call does nothing until it is awaited or spawned"]
pub struct PendingCall {
    request: Request,
    event_path: String,
    message_prop: Option<String>,
    transport: Arc<dyn Transport>,
    events: Arc<EventBus>,
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("request", &self.request)
            .field("event_path", &self.event_path)
            .finish_non_exhaustive()
    }
}

impl PendingCall {
    /// Returns the request that will be sent.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Sends the request and emits the completion events.
    pub async fn send(self) -> Completion {
        let Self {
            request,
            event_path,
            message_prop,
            transport,
            events,
        } = self;

        tracing::debug!("Dispatching {} {}", request.method, request.url);

        let response = match transport.send(&request).await {
            Ok(raw) => Response::classify(raw, message_prop.as_deref()),
            Err(error) => {
                tracing::warn!(
                    "Connection error for {} {}: {}",
                    request.method,
                    request.url,
                    error
                );
                Response::connection_error()
            }
        };

        if let Some(status) = response.status {
            tracing::debug!(
                "Completed {} {} with status {}",
                request.method,
                request.url,
                status
            );
        }

        let outcome = response.outcome();
        let event_types = [
            "status".to_string(),
            format!("status:{}", response.status.unwrap_or(0)),
            "res".to_string(),
            format!("res:{event_path}"),
            outcome.to_string(),
            format!("{outcome}:{event_path}"),
        ];
        for event_type in &event_types {
            events.emit(
                event_type,
                &mut Event::Response {
                    request: &request,
                    response: &response,
                },
            );
        }

        Completion { request, response }
    }

    /// Sends the request on the tokio runtime and returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<Completion> {
        tokio::spawn(self.send())
    }
}

impl IntoFuture for PendingCall {
    type Output = Completion;
    type IntoFuture = Pin<Box<dyn Future<Output = Completion> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

/// A client for one REST collection.
///
/// # Thread Safety
///
/// `Resource` is `Send + Sync`. Verbs take `&self`, so one resource can
/// issue concurrent calls; configuration setters take `&mut self`.
///
/// # Example
///
/// ```rust
/// use rest_resource::{HttpClient, Resource};
///
/// let mut users = Resource::new("/api/users", HttpClient::new().unwrap());
/// users
///     .set_param("auth_token", "asdf1234")
///     .set_header("X-Client", "docs")
///     .unwrap();
///
/// assert_eq!(users.param("auth_token"), Some("asdf1234"));
/// assert_eq!(users.header("x-client"), Some("docs"));
/// ```
#[derive(Debug)]
pub struct Resource {
    url: String,
    id_key: String,
    message_prop: Option<String>,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    serializer: Option<Arc<dyn BodySerializer>>,
    transport: Arc<dyn Transport>,
    events: Arc<EventBus>,
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
};

impl Resource {
    /// Creates a resource rooted at `url` with default configuration.
    ///
    /// An empty URL means `"/"`.
    #[must_use]
    pub fn new(url: impl Into<String>, transport: impl Transport + 'static) -> Self {
        let config = ResourceConfig::builder().url(url).build().unwrap_or_default();
        Self::with_transport(&config, Arc::new(transport))
    }

    /// Creates a resource from a validated configuration.
    #[must_use]
    pub fn from_config(config: &ResourceConfig, transport: impl Transport + 'static) -> Self {
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a resource that shares a transport with other resources.
    #[must_use]
    pub fn with_transport(config: &ResourceConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: config.url().to_string(),
            id_key: config.id_key().to_string(),
            message_prop: config.message_prop().map(String::from),
            query: config.query().clone(),
            headers: config.headers().clone(),
            serializer: config.serializer().cloned(),
            transport,
            events: Arc::new(EventBus::new()),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replaces the base URL. An empty URL means `"/"`.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        let url = url.into();
        self.url = if url.is_empty() { "/".to_string() } else { url };
        self
    }

    /// Returns the body property read by `put`/`patch` for bare objects.
    #[must_use]
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Replaces the id key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyIdKey`] if the key is empty.
    pub fn set_id_key(&mut self, id_key: impl Into<String>) -> Result<&mut Self, ConfigError> {
        let id_key = id_key.into();
        validate_id_key(&id_key)?;
        self.id_key = id_key;
        Ok(self)
    }

    /// Returns the JSON property used as error text, if configured.
    #[must_use]
    pub fn message_prop(&self) -> Option<&str> {
        self.message_prop.as_deref()
    }

    /// Sets or clears the JSON property used as error text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMessageProp`] for `Some("")`.
    pub fn set_message_prop(&mut self, prop: Option<String>) -> Result<&mut Self, ConfigError> {
        if let Some(prop) = &prop {
            validate_message_prop(prop)?;
        }
        self.message_prop = prop;
        Ok(self)
    }

    /// Replaces the body serializer.
    pub fn set_serializer(&mut self, serializer: impl BodySerializer + 'static) -> &mut Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Removes the body serializer; bodies are sent as rendered text.
    pub fn clear_serializer(&mut self) -> &mut Self {
        self.serializer = None;
        self
    }

    // ------------------------------------------------------------------
    // Default query parameters
    // ------------------------------------------------------------------

    /// Returns a default query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns all default query parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Sets a default query parameter sent with every call.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Removes a default query parameter.
    pub fn unset_param(&mut self, key: &str) -> &mut Self {
        self.query.remove(key);
        self
    }

    /// Sets several default query parameters.
    pub fn set_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.set_param(key, value);
        }
        self
    }

    /// Applies several changes; a `None` value removes that key.
    pub fn merge_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            let key = key.into();
            match value {
                Some(value) => self.set_param(key, value),
                None => self.unset_param(&key),
            };
        }
        self
    }

    // ------------------------------------------------------------------
    // Default headers
    // ------------------------------------------------------------------

    /// Returns a default header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns all default headers (lower-cased names).
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Sets a default header sent with every call. The name is lower-cased.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] if the name is not a valid
    /// HTTP header name.
    pub fn set_header(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ConfigError> {
        let key = header_key(name.as_ref())?;
        self.headers.insert(key, value.into());
        Ok(self)
    }

    /// Removes a default header by case-insensitive name.
    pub fn unset_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(&name.to_ascii_lowercase());
        self
    }

    /// Sets several default headers. Nothing changes if any name is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] for the first invalid name.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let validated = headers
            .into_iter()
            .map(|(name, value)| -> Result<(String, String), ConfigError> {
                Ok((header_key(name.as_ref())?, value.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.headers.extend(validated);
        Ok(self)
    }

    /// Applies several changes; a `None` value removes that header.
    /// Nothing changes if any name being set is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] for the first invalid name.
    pub fn merge_headers<I, K, V>(&mut self, headers: I) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let changes = headers
            .into_iter()
            .map(
                |(name, value)| -> Result<(String, Option<String>), ConfigError> {
                    match value {
                        Some(value) => Ok((header_key(name.as_ref())?, Some(value.into()))),
                        None => Ok((name.as_ref().to_ascii_lowercase(), None)),
                    }
                },
            )
            .collect::<Result<Vec<_>, _>>()?;
        for (key, value) in changes {
            match value {
                Some(value) => self.headers.insert(key, value),
                None => self.headers.remove(&key),
            };
        }
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Returns this resource's event bus.
    ///
    /// Clone the `Arc` to let a handler remove itself during dispatch.
    #[must_use]
    pub const fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Registers a handler for an event type. See [`EventBus::on`].
    pub fn on<F>(&self, event_type: impl Into<String>, handler: F) -> Listener
    where
        F: Fn(&mut Event<'_>) + Send + Sync + 'static,
    {
        self.events.on(event_type, handler)
    }

    /// Removes one registration of a handler. See [`EventBus::remove_listener`].
    pub fn remove_listener(&self, event_type: &str, listener: &Listener) -> bool {
        self.events.remove_listener(event_type, listener)
    }

    // ------------------------------------------------------------------
    // Verbs
    // ------------------------------------------------------------------

    /// Lists the collection: `GET /`.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn index(&self, options: Option<CallOptions>) -> Result<PendingCall, ResourceError> {
        self.call("GET /", None, options)
    }

    /// Fetches one member: `GET /<id>`.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn get(
        &self,
        id: impl fmt::Display,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.call(&format!("GET /{id}"), None, options)
    }

    /// Creates a member: `POST /` with `body`.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn post(
        &self,
        body: serde_json::Value,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.call("POST /", Some(body), options)
    }

    /// Replaces a member: `PUT /<id>` with the body.
    ///
    /// Pass `(id, body)` or a bare object carrying its id under the id key.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if a bare object has no id, or
    /// any error from [`call`](Self::call).
    pub fn put(
        &self,
        target: impl Into<UpdateTarget>,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        let (id, body) = target.into().resolve(&self.id_key)?;
        self.call(&format!("PUT /{id}"), Some(body), options)
    }

    /// Partially updates a member: like [`put`](Self::put) but sent as `PATCH`.
    ///
    /// An explicit method in `options` still takes precedence.
    ///
    /// # Errors
    ///
    /// Same as [`put`](Self::put).
    pub fn patch(
        &self,
        target: impl Into<UpdateTarget>,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        let options = options.unwrap_or_default();
        let options = match options.method_override() {
            Some(_) => options,
            None => options.method(Method::Patch),
        };
        self.put(target, Some(options))
    }

    /// Deletes a member: `DELETE /<id>`.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn del(
        &self,
        id: impl fmt::Display,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.call(&format!("DELETE /{id}"), None, options)
    }

    /// Alias of [`post`](Self::post).
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn create(
        &self,
        body: serde_json::Value,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.post(body, options)
    }

    /// Alias of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn read(
        &self,
        id: impl fmt::Display,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.get(id, options)
    }

    /// Alias of [`put`](Self::put).
    ///
    /// # Errors
    ///
    /// See [`put`](Self::put).
    pub fn update(
        &self,
        target: impl Into<UpdateTarget>,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.put(target, options)
    }

    /// Alias of [`del`](Self::del).
    ///
    /// # Errors
    ///
    /// See [`del`](Self::del).
    pub fn remove(
        &self,
        id: impl fmt::Display,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.del(id, options)
    }

    /// Alias of [`del`](Self::del).
    ///
    /// # Errors
    ///
    /// See [`del`](Self::del).
    pub fn delete(
        &self,
        id: impl fmt::Display,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        self.del(id, options)
    }

    /// Builds a call from a verb-prefixed route such as `"POST /42/activate"`.
    ///
    /// The descriptor is built, the body serialized, and the `req` events
    /// emitted before this returns. A `null` body counts as no body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialize`] if the serializer rejects the
    /// body. Nothing is emitted in that case.
    pub fn call(
        &self,
        route: &str,
        body: Option<serde_json::Value>,
        options: Option<CallOptions>,
    ) -> Result<PendingCall, ResourceError> {
        let options = options.unwrap_or_default();
        let route = parse_route(route, options.method_override());

        let mut query = self.query.clone();
        query.extend(
            options
                .query_params()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let mut headers = self.headers.clone();
        headers.extend(
            options
                .headers()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let relative_url = format!("{}{}", route.path, query_string(&query));
        let url = compose_url(&self.url, &relative_url);
        let raw_body = body.filter(|body| !body.is_null());

        let mut request = Request {
            method: route.method,
            path: route.path,
            relative_url: relative_url.clone(),
            url,
            query,
            headers,
            raw_body: raw_body.clone(),
            body: None,
            body_serialized: None,
            response_type: options.response_type_hint().map(String::from),
        };

        if let Some(raw) = &raw_body {
            match &self.serializer {
                Some(serializer) if options.serializes() => {
                    let serialized = serializer.serialize(raw, &mut request)?;
                    request.body = Some(serialized.clone());
                    request.body_serialized = Some(serialized);
                }
                _ => request.body = Some(render_unserialized(raw)),
            }
        }

        tracing::debug!("Built {} {}", request.method, request.url);

        self.events.emit("req", &mut Event::Request(&mut request));
        self.events.emit(
            &format!("req:{relative_url}"),
            &mut Event::Request(&mut request),
        );

        Ok(PendingCall {
            request,
            event_path: relative_url,
            message_prop: self.message_prop.clone(),
            transport: Arc::clone(&self.transport),
            events: Arc::clone(&self.events),
        })
    }
}
