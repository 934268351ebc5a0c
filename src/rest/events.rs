//! Per-resource lifecycle events.
//!
//! Every [`Resource`](crate::Resource) owns an [`EventBus`]. Event types are
//! plain strings matched exactly; path-scoped names such as `res:/users/42`
//! are built by the resource, not by pattern matching here.
//!
//! Types emitted by a resource, in order:
//!
//! | Type | When | Payload |
//! |---|---|---|
//! | `req`, `req:<relative_url>` | before the transport is invoked | [`Event::Request`] |
//! | `status`, `status:<code>` | after completion | [`Event::Response`] |
//! | `res`, `res:<relative_url>` | after completion | [`Event::Response`] |
//! | `success`/`error`, `<outcome>:<relative_url>` | after completion | [`Event::Response`] |
//!
//! # Example
//!
//! ```rust
//! use rest_resource::rest::{Event, EventBus};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let bus = EventBus::new();
//! let count = Arc::new(AtomicUsize::new(0));
//!
//! let seen = Arc::clone(&count);
//! let listener = bus.on("res", move |_event: &mut Event<'_>| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert!(bus.remove_listener("res", &listener));
//! assert_eq!(bus.listener_count("res"), 0);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::clients::{Request, Response};

/// The payload delivered to listeners.
#[derive(Debug)]
pub enum Event<'a> {
    /// A request about to be dispatched. Listeners may modify it.
    Request(&'a mut Request),
    /// A completed call.
    Response {
        /// The request as dispatched.
        request: &'a Request,
        /// The classified response.
        response: &'a Response,
    },
}

impl Event<'_> {
    /// Returns the request this event concerns.
    #[must_use]
    pub fn request(&self) -> &Request {
        match self {
            Self::Request(request) => &**request,
            Self::Response { request, .. } => *request,
        }
    }

    /// Returns the response for completion events.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Request(_) => None,
            Self::Response { response, .. } => Some(*response),
        }
    }

    /// Returns the request mutably, for `req` events only.
    pub fn request_mut(&mut self) -> Option<&mut Request> {
        match self {
            Self::Request(request) => Some(&mut **request),
            Self::Response { .. } => None,
        }
    }
}

type Handler = dyn Fn(&mut Event<'_>) + Send + Sync;

/// A registered handler.
///
/// Cloning a `Listener` yields a handle to the same registration target;
/// [`EventBus::remove_listener`] compares handles by identity.
#[derive(Clone)]
pub struct Listener(Arc<Handler>);

impl Listener {
    /// Wraps a handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut Event<'_>) + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Returns true if both handles refer to the same handler.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, event: &mut Event<'_>) {
        (self.0)(event);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// String-keyed publish/subscribe registry.
///
/// The listener map is only locked while it is read or modified, never while
/// a handler runs, so handlers may register or remove listeners (including
/// themselves) during dispatch.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

// Verify EventBus is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EventBus>();
};

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type` and returns its handle.
    ///
    /// Handlers for one type run in registration order.
    pub fn on<F>(&self, event_type: impl Into<String>, handler: F) -> Listener
    where
        F: Fn(&mut Event<'_>) + Send + Sync + 'static,
    {
        let listener = Listener::new(handler);
        self.add_listener(event_type, listener.clone());
        listener
    }

    /// Registers an existing handle. The same handle may be registered more than once.
    pub fn add_listener(&self, event_type: impl Into<String>, listener: Listener) {
        self.listeners
            .write()
            .entry(event_type.into())
            .or_default()
            .push(listener);
    }

    /// Removes the first registration of `listener` under `event_type`.
    ///
    /// Exactly one registration is removed per call. Returns whether one was found.
    pub fn remove_listener(&self, event_type: &str, listener: &Listener) -> bool {
        let mut listeners = self.listeners.write();
        let Some(registered) = listeners.get_mut(event_type) else {
            return false;
        };
        let Some(index) = registered.iter().position(|l| l.same_as(listener)) else {
            return false;
        };
        registered.remove(index);
        if registered.is_empty() {
            listeners.remove(event_type);
        }
        true
    }

    /// Invokes every handler registered for `event_type` at the time of the call.
    ///
    /// Emitting a type with no handlers does nothing.
    pub fn emit(&self, event_type: &str, event: &mut Event<'_>) {
        let snapshot = match self.listeners.read().get(event_type) {
            Some(registered) => registered.clone(),
            None => return,
        };

        tracing::trace!("Emitting '{}' to {} listener(s)", event_type, snapshot.len());
        for listener in &snapshot {
            listener.call(event);
        }
    }

    /// Returns the number of registrations for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.read().get(event_type).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut counts: Vec<(&String, usize)> =
            listeners.iter().map(|(k, v)| (k, v.len())).collect();
        counts.sort();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponse, Method};
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    fn request() -> Request {
        Request {
            method: Method::Get,
            path: "/".to_string(),
            relative_url: "/".to_string(),
            url: "/".to_string(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            raw_body: None,
            body: None,
            body_serialized: None,
            response_type: None,
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &str) -> impl Fn(&mut Event<'_>) + Send + Sync {
        let log = Arc::clone(log);
        let name = name.to_string();
        move |_event: &mut Event<'_>| log.lock().push(name.clone())
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.on("req", recorder(&log, "first"));
        bus.on("req", recorder(&log, "second"));
        bus.on("req", recorder(&log, "third"));

        let mut req = request();
        bus.emit("req", &mut Event::Request(&mut req));

        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_emit_matches_exact_type_only() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.on("res", recorder(&log, "res"));
        bus.on("res:/users", recorder(&log, "scoped"));

        let mut req = request();
        bus.emit("res:/users/1", &mut Event::Request(&mut req));
        assert!(log.lock().is_empty());

        bus.emit("res:/users", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["scoped"]);
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let bus = EventBus::new();
        let mut req = request();
        bus.emit("nothing", &mut Event::Request(&mut req));
        assert_eq!(bus.listener_count("nothing"), 0);
    }

    #[test]
    fn test_remove_listener_removes_one_registration() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = Listener::new(recorder(&log, "twice"));
        bus.add_listener("req", listener.clone());
        bus.add_listener("req", listener.clone());
        assert_eq!(bus.listener_count("req"), 2);

        assert!(bus.remove_listener("req", &listener));
        assert_eq!(bus.listener_count("req"), 1);

        let mut req = request();
        bus.emit("req", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["twice"]);
    }

    #[test]
    fn test_remove_first_registered_listener() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = bus.on("req", recorder(&log, "first"));
        bus.on("req", recorder(&log, "second"));

        assert!(bus.remove_listener("req", &first));

        let mut req = request();
        bus.emit("req", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["second"]);
    }

    #[test]
    fn test_remove_unknown_listener_returns_false() {
        let bus = EventBus::new();
        let registered = bus.on("req", |_event: &mut Event<'_>| {});
        let stranger = Listener::new(|_event: &mut Event<'_>| {});

        assert!(!bus.remove_listener("req", &stranger));
        assert!(!bus.remove_listener("res", &registered));
        assert_eq!(bus.listener_count("req"), 1);
    }

    #[test]
    fn test_self_removal_during_emit_does_not_skip_others() {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let own_handle: Arc<Mutex<Option<Listener>>> = Arc::new(Mutex::new(None));

        let handle_slot = Arc::clone(&own_handle);
        let bus_ref = Arc::clone(&bus);
        let log_ref = Arc::clone(&log);
        let once = bus.on("res", move |_event: &mut Event<'_>| {
            log_ref.lock().push("once".to_string());
            if let Some(me) = handle_slot.lock().as_ref() {
                bus_ref.remove_listener("res", me);
            }
        });
        *own_handle.lock() = Some(once);
        bus.on("res", recorder(&log, "after"));

        let mut req = request();
        bus.emit("res", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["once", "after"]);

        bus.emit("res", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["once", "after", "after"]);
    }

    #[test]
    fn test_listener_added_during_emit_waits_for_next_emit() {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let bus_ref = Arc::clone(&bus);
        let late = recorder(&log, "late");
        let late = Listener::new(late);
        bus.on("req", move |_event: &mut Event<'_>| {
            bus_ref.add_listener("req", late.clone());
        });

        let mut req = request();
        bus.emit("req", &mut Event::Request(&mut req));
        assert!(log.lock().is_empty());

        bus.emit("req", &mut Event::Request(&mut req));
        assert_eq!(*log.lock(), vec!["late"]);
    }

    #[test]
    fn test_request_listeners_can_mutate() {
        let bus = EventBus::new();
        bus.on("req", |event: &mut Event<'_>| {
            if let Some(request) = event.request_mut() {
                request
                    .headers
                    .insert("x-signed".to_string(), "yes".to_string());
            }
        });

        let mut req = request();
        bus.emit("req", &mut Event::Request(&mut req));
        assert_eq!(req.header("X-Signed"), Some("yes"));
    }

    #[test]
    fn test_response_event_accessors() {
        let req = request();
        let response = Response::classify(HttpResponse::new(200, "{}"), None);
        let event = Event::Response {
            request: &req,
            response: &response,
        };

        assert_eq!(event.request().path, "/");
        assert_eq!(event.response().and_then(|r| r.status), Some(200));
    }
}
