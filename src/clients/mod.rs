//! Transport-facing types.
//!
//! This module holds everything that crosses the boundary between a
//! [`Resource`](crate::Resource) and the network:
//!
//! - [`Request`]: the fully built descriptor handed to a transport
//! - [`Method`]: the HTTP methods a resource issues
//! - [`CallOptions`]: per-call overrides accepted by every verb
//! - [`Transport`]: the collaborator trait performing one HTTP exchange
//! - [`HttpClient`]: the reqwest-backed [`Transport`]
//! - [`HttpResponse`]: what a transport reports back
//! - [`Response`] and [`ResponseData`]: the classified, decoded result
//! - [`TransportError`]: failures a transport reports instead of a response
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::{HttpClient, Resource};
//!
//! let transport = HttpClient::new()?.with_origin("http://localhost:3000");
//! let users = Resource::new("/api/users", transport);
//!
//! let completion = users.get(42, None)?.await;
//! ```

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::TransportError;
pub use http_client::{HttpClient, Transport, SDK_VERSION};
pub use http_request::{CallOptions, Method, Request};
pub use http_response::{HttpResponse, Response, ResponseData, CONNECTION_ERROR};
