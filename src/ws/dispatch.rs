//! Routing of classified frames to handlers, awaiting callers and the queue.
//!
//! Responses go, in order of preference, to the caller awaiting them, the
//! handler registered for the request's method, the catch-all response
//! handler, and finally the dispatch queue. Push events go to the handler
//! registered for their canonical method, then the unknown-event handler if
//! one is registered, then the queue. Whatever is left is logged and dropped.
//!
//! Nothing here is fatal: malformed frames and responses for unknown ids are
//! logged, reported to the error handler, and the stream continues.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::HitbtcError;
use crate::types::rpc::{Outcome, PushEvent, Request, Response};

use super::frame::{self, Frame};
use super::queue::{DispatchQueue, Dispatched};
use super::tracker::RequestTracker;

// ---------------------------------------------------------------------------
// Handler traits
// ---------------------------------------------------------------------------

/// Receives settled requests.
///
/// Implemented for every `Fn(&Request, &Outcome) + Send + Sync` closure.
pub trait ResponseHandler: Send + Sync {
    fn on_response(&self, request: &Request, outcome: &Outcome);
}

impl<F> ResponseHandler for F
where
    F: Fn(&Request, &Outcome) + Send + Sync,
{
    fn on_response(&self, request: &Request, outcome: &Outcome) {
        self(request, outcome)
    }
}

/// Receives push events.
///
/// Implemented for every `Fn(&PushEvent) + Send + Sync` closure.
pub trait PushEventHandler: Send + Sync {
    fn on_event(&self, event: &PushEvent);
}

impl<F> PushEventHandler for F
where
    F: Fn(&PushEvent) + Send + Sync,
{
    fn on_event(&self, event: &PushEvent) {
        self(event)
    }
}

/// Receives errors that do not stop the client: malformed frames, unknown
/// response ids, server errors, failed logins, transport failures (before a
/// reconnect) and an exhausted reconnect budget.
pub trait ErrorHandler: Send + Sync {
    fn on_error(&self, error: &HitbtcError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&HitbtcError) + Send + Sync,
{
    fn on_error(&self, error: &HitbtcError) {
        self(error)
    }
}

#[derive(Default)]
struct Registry {
    by_method: HashMap<String, Arc<dyn ResponseHandler>>,
    any_response: Option<Arc<dyn ResponseHandler>>,
    events: HashMap<String, Arc<dyn PushEventHandler>>,
    unknown_event: Option<Arc<dyn PushEventHandler>>,
    error: Option<Arc<dyn ErrorHandler>>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes inbound frames.
///
/// Handlers may be (re)registered at any time; a registration replaces the
/// previous handler for the same key. Handlers run on the connection's read
/// task and should return quickly.
pub struct Dispatcher {
    tracker: Arc<RequestTracker>,
    registry: RwLock<Registry>,
    queue: Option<Arc<DispatchQueue>>,
}

impl Dispatcher {
    /// Create a dispatcher settling requests from `tracker`. Without a queue,
    /// unhandled items are logged and dropped.
    pub fn new(tracker: Arc<RequestTracker>, queue: Option<Arc<DispatchQueue>>) -> Self {
        Self {
            tracker,
            registry: RwLock::new(Registry::default()),
            queue,
        }
    }

    /// The request tracker.
    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// The dispatch queue, if enabled.
    pub fn queue(&self) -> Option<&Arc<DispatchQueue>> {
        self.queue.as_ref()
    }

    // -- registration --------------------------------------------------------

    /// Handler for responses that have no method-specific handler.
    pub fn on_response<H: ResponseHandler + 'static>(&self, handler: H) {
        self.with_registry(|r| r.any_response = Some(Arc::new(handler)));
    }

    /// Handler for responses to requests sent with `method`.
    pub fn on_response_for<H: ResponseHandler + 'static>(&self, method: impl Into<String>, handler: H) {
        let method = method.into();
        self.with_registry(|r| {
            r.by_method.insert(method, Arc::new(handler));
        });
    }

    /// Handler for push events whose canonical method matches `method`.
    ///
    /// `method` is normalized first, so `"ticker"` and `"updateTicker"`
    /// register the same handler.
    pub fn on_push_event<H: PushEventHandler + 'static>(&self, method: &str, handler: H) {
        let method = frame::normalize(method);
        self.with_registry(|r| {
            r.events.insert(method, Arc::new(handler));
        });
    }

    /// Handler for push events with no method-specific handler.
    ///
    /// Once registered it takes those events ahead of the queue.
    pub fn on_unknown_event<H: PushEventHandler + 'static>(&self, handler: H) {
        self.with_registry(|r| r.unknown_event = Some(Arc::new(handler)));
    }

    /// Handler for non-fatal errors.
    pub fn on_error<H: ErrorHandler + 'static>(&self, handler: H) {
        self.with_registry(|r| r.error = Some(Arc::new(handler)));
    }

    // -- routing -------------------------------------------------------------

    /// Classify and route one text frame.
    pub fn dispatch_text(&self, text: &str) {
        self.dispatch_frame(frame::decode(text));
    }

    /// Route one classified frame.
    pub fn dispatch_frame(&self, frame: Frame) {
        match frame {
            Frame::Response(response) => self.dispatch_response(response),
            Frame::Push(event) => self.dispatch_event(event),
            Frame::Malformed(reason) => {
                tracing::warn!(reason = %reason, "Dropping malformed frame");
                self.report(HitbtcError::MalformedFrame(reason));
            }
        }
    }

    /// Settle the request a response answers.
    pub fn dispatch_response(&self, response: Response) {
        let resolved = match self.tracker.resolve(response.id) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(id = response.id, "Response for unknown request id");
                self.report(err);
                return;
            }
        };

        if let Outcome::Failure(ref err) = response.outcome {
            tracing::warn!(
                id = response.id,
                method = %resolved.request.method,
                code = err.code,
                message = %err.message,
                description = %err.description,
                "Server rejected request"
            );
            self.report(HitbtcError::Server(err.clone()));
        }

        if let Some((request, outcome)) = resolved.settle(response.outcome) {
            self.deliver_response(request, outcome);
        }
    }

    /// Route a push event.
    pub fn dispatch_event(&self, event: PushEvent) {
        let (handler, fallback) = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            (
                registry.events.get(&event.method).cloned(),
                registry.unknown_event.clone(),
            )
        };

        if let Some(handler) = handler {
            handler.on_event(&event);
        } else if let Some(fallback) = fallback {
            fallback.on_event(&event);
        } else if let Some(queue) = &self.queue {
            queue.push(Dispatched::Event(event));
        } else {
            tracing::debug!(
                method = %event.raw_method,
                symbol = %event.symbol,
                "No handler for push event, dropped"
            );
        }
    }

    /// Settle every outstanding request with `outcome`.
    ///
    /// Awaiting callers receive it directly; the rest are routed like
    /// responses. Returns how many requests were settled.
    pub fn fail_outstanding(&self, outcome: Outcome) -> usize {
        let drained = self.tracker.fail_all();
        let count = drained.len();
        for resolved in drained {
            if let Some((request, outcome)) = resolved.settle(outcome.clone()) {
                self.deliver_response(request, outcome);
            }
        }
        count
    }

    /// Pass an error to the error handler, if one is registered.
    pub fn report(&self, error: HitbtcError) {
        let handler = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone();
        if let Some(handler) = handler {
            handler.on_error(&error);
        }
    }

    fn deliver_response(&self, request: Request, outcome: Outcome) {
        let handler = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .by_method
                .get(&request.method)
                .or(registry.any_response.as_ref())
                .cloned()
        };

        if let Some(handler) = handler {
            handler.on_response(&request, &outcome);
        } else if let Some(queue) = &self.queue {
            queue.push(Dispatched::Response { request, outcome });
        } else {
            tracing::debug!(
                id = request.id,
                method = %request.method,
                success = outcome.is_success(),
                "No handler for response, dropped"
            );
        }
    }

    fn with_registry(&self, f: impl FnOnce(&mut Registry)) {
        f(&mut self.registry.write().unwrap_or_else(PoisonError::into_inner));
    }
}
