//! Host event delivery and per-device capture state
//!
//! ```text
//! Host ──dispatch──► EventTarget ──handler──► CaptureWriter ──► latest-event map
//!                        ▲                         │
//!                 CancellationToken ◄──────────────┘ (checked under the write lock)
//! ```
//!
//! A device subscribes to its [`EventTarget`] once per connect cycle, with
//! a fresh [`CancellationToken`]. Disconnecting cancels that token, which
//! drops every listener of the cycle at once. Handlers re-check the token
//! while holding the state lock, so after `disconnect()` returns the
//! latest-event map can no longer change, even for events the host was
//! already dispatching on another thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::RawEvent;

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

struct Listener<E> {
    token: CancellationToken,
    handler: Handler<E>,
}

/// Listener list the host pushes raw events into.
///
/// Cloning yields another handle to the same list; hand one clone to the
/// device and keep one in the host loop.
pub struct EventTarget<E> {
    listeners: Arc<Mutex<Vec<Listener<E>>>>,
}

impl<E> EventTarget<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers `handler` until `token` is cancelled
    pub fn listen<F>(&self, token: &CancellationToken, handler: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        listeners.push(Listener {
            token: token.clone(),
            handler: Box::new(handler),
        });
        debug!("Listener registered ({} total)", listeners.len());
    }

    /// Delivers `event` synchronously to every live listener.
    ///
    /// Handlers must not dispatch into the same target.
    pub fn dispatch(&self, event: &E) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|listener| !listener.token.is_cancelled());
        trace!("Dispatching event to {} listener(s)", listeners.len());
        for listener in listeners.iter() {
            (listener.handler)(event);
        }
    }

    /// Number of listeners whose token is still live
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|listener| !listener.token.is_cancelled())
            .count()
    }
}

impl<E> Clone for EventTarget<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventTarget<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Latest raw event per control key
pub type EventMap = HashMap<String, RawEvent>;

/// Latest-event map plus the token of the current connect cycle
#[derive(Debug, Default)]
pub(crate) struct CaptureState {
    events: Arc<RwLock<EventMap>>,
    token: Option<CancellationToken>,
}

impl CaptureState {
    /// Ends any previous cycle and starts a new one with an empty map
    pub fn begin(&mut self) -> CancellationToken {
        self.end();
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        token
    }

    /// Cancels the current cycle and clears captured events.
    ///
    /// Returns false when there was no cycle to end.
    pub fn end(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                token.cancel();
                self.events.write().clear();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    pub fn get(&self, key: &str) -> Option<RawEvent> {
        self.events.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.events.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Copy of the whole map taken under a single read lock
    pub fn snapshot(&self) -> EventMap {
        self.events.read().clone()
    }

    pub fn writer(&self, token: &CancellationToken) -> CaptureWriter {
        CaptureWriter {
            events: Arc::clone(&self.events),
            token: token.clone(),
        }
    }
}

/// Write handle given to capture handlers; inert once its token is cancelled
#[derive(Clone)]
pub(crate) struct CaptureWriter {
    events: Arc<RwLock<EventMap>>,
    token: CancellationToken,
}

impl CaptureWriter {
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut EventMap),
    {
        let mut events = self.events.write();
        if self.token.is_cancelled() {
            trace!("Capture cycle cancelled, dropping event");
            return;
        }
        f(&mut events);
    }
}
