//! REST resources and their supporting pieces.
//!
//! This module provides:
//!
//! - **[`Resource`]**: A client for one REST collection with CRUD verbs
//! - **[`PendingCall`] / [`Completion`]**: A built request and its outcome
//! - **[`EventBus`]**: Per-resource lifecycle events
//! - **Path building**: Route parsing, query strings, URL composition
//! - **[`BodySerializer`]**: Pluggable request body encoding
//! - **[`ResourceError`]**: Errors detected while building a call
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::{CallOptions, HttpClient, Resource};
//! use serde_json::json;
//!
//! let users = Resource::new(
//!     "/api/users",
//!     HttpClient::new()?.with_origin("http://localhost:3000"),
//! );
//!
//! // GET /api/users/?page=2
//! let page = users.index(Some(CallOptions::new().query("page", "2")))?.await;
//!
//! // PUT /api/users/7
//! let saved = users.put(json!({"id": 7, "name": "benny"}), None)?.await;
//! assert!(saved.is_success());
//! ```

mod errors;
mod events;
mod path;
mod resource;
mod serialize;

// Public exports
pub use errors::{ResourceError, SerializeError};
pub use events::{Event, EventBus, Listener};
pub use path::{compose_url, normalize_base_url, normalize_path, parse_route, query_string, Route};
pub use resource::{Completion, PendingCall, Resource, UpdateTarget};
pub use serialize::{render_unserialized, BodySerializer, JsonSerializer};
