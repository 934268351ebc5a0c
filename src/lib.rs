//! # rest-resource
//!
//! A small client for REST collections. A [`Resource`] turns terse calls
//! such as `users.get(42)` into fully built HTTP requests, sends them through
//! a pluggable [`Transport`], and reports every step through a per-resource
//! event bus.
//!
//! ## Overview
//!
//! This crate provides:
//! - CRUD verbs (`index`, `get`, `post`, `put`, `patch`, `del`) and their
//!   aliases on [`Resource`]
//! - Default query parameters and headers per resource, overridable per call
//! - Deterministic URL composition and query-string building
//! - Pluggable body serialization via [`rest::BodySerializer`]
//! - Lifecycle events (`req`, `status`, `res`, `success`/`error`, plus
//!   path-scoped variants) via [`EventBus`]
//! - A reqwest-backed [`HttpClient`] transport
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_resource::{HttpClient, Resource};
//!
//! let mut users = Resource::new("/api/users", HttpClient::new().unwrap());
//! users.set_param("auth_token", "asdf1234");
//!
//! let pending = users.get(42, None).unwrap();
//! assert_eq!(pending.request().url, "/api/users/42?auth_token=asdf1234");
//! ```
//!
//! ## Sending Requests
//!
//! Verbs build the request and emit `req` events synchronously. Awaiting the
//! returned [`PendingCall`] sends it:
//!
//! ```rust,ignore
//! use rest_resource::{HttpClient, Resource};
//! use serde_json::json;
//!
//! let transport = HttpClient::new()?.with_origin("http://localhost:3000");
//! let users = Resource::new("/api/users", transport);
//!
//! users.on("error", |event| {
//!     if let Some(response) = event.response() {
//!         eprintln!("{} failed: {:?}", event.request().url, response.error);
//!     }
//! });
//!
//! let completion = users.post(json!({"name": "billiam"}), None)?.await;
//! match completion.error() {
//!     None => println!("created: {:?}", completion.data()),
//!     Some(error) => println!("create failed: {error}"),
//! }
//! ```
//!
//! ## Custom Transports
//!
//! Anything implementing [`Transport`] can carry requests, which is how tests
//! and non-HTTP backends plug in:
//!
//! ```rust
//! use rest_resource::{async_trait, HttpResponse, Request, Transport, TransportError};
//!
//! #[derive(Debug)]
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn send(&self, _request: &Request) -> Result<HttpResponse, TransportError> {
//!         Ok(HttpResponse::new(200, r#"{"ok":true}"#))
//!     }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Each resource owns its defaults and event bus
//! - **Fail-fast validation**: Configuration and call building report errors
//!   before anything is sent
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ResourceConfig, ResourceConfigBuilder};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{
    CallOptions, HttpClient, HttpResponse, Method, Request, Response, ResponseData, Transport,
    TransportError, CONNECTION_ERROR,
};

// Re-export resource types
pub use rest::{
    Completion, Event, EventBus, Listener, PendingCall, Resource, ResourceError, UpdateTarget,
};

pub use async_trait::async_trait;
