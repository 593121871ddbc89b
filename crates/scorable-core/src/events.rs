//! Event hooks for the retry manager and rate limiter.
//!
//! Each stateful component owns an [`EventListeners`] collection and emits a
//! typed event for every decision it makes (retry scheduled, permit granted,
//! call rejected, ...). Listeners are the extension point for logging,
//! metrics and test assertions.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// An event emitted by a named client component.
pub trait ClientEvent: Send + Sync + fmt::Debug {
    /// Short, stable identifier of the event (e.g. `"Retry"`, `"PermitRejected"`).
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the component instance that emitted the event.
    fn component_name(&self) -> &str;
}

/// Receives events of type `E`.
pub trait EventListener<E: ClientEvent>: Send + Sync {
    /// Called synchronously for every emitted event.
    fn on_event(&self, event: &E);
}

/// Shared, type-erased listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// Ordered collection of listeners for one component.
#[derive(Clone)]
pub struct EventListeners<E: ClientEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: ClientEvent> EventListeners<E> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener. Listeners run in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener.
    ///
    /// A panic inside one listener is contained; the remaining listeners still
    /// observe the event and the caller's operation is unaffected.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ClientEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ClientEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ClientEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
