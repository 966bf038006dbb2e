//! Outstanding request tracking and correlation id allocation.
//!
//! Every request is registered here *before* its frame is written, so a
//! response can never arrive for an id the tracker does not know yet. Entries
//! leave the tracker exactly once: when the response arrives, when the
//! connection is lost, when the client stops, or when an awaiting caller gives
//! up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::constants::ID_TICKS_PER_SECOND;
use crate::error::{HitbtcError, Result};
use crate::types::rpc::{Outcome, Params, Request};

/// Sender half handed the outcome of an awaited request.
pub type Waiter = oneshot::Sender<Outcome>;

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Clock-derived correlation id source.
///
/// Ids are the current time in 100 µs ticks, bumped past the last issued id
/// so they stay strictly increasing under bursts and concurrent callers.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id; never equal to any id previously returned by this generator.
    pub fn next_id(&self) -> u64 {
        let now = clock_ticks();
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(prev.saturating_add(1))
    }
}

fn clock_ticks() -> u64 {
    let micros = chrono::Utc::now().timestamp_micros();
    u64::try_from(micros / (1_000_000 / ID_TICKS_PER_SECOND)).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

struct Pending {
    request: Request,
    waiter: Option<Waiter>,
}

/// A request removed from the tracker, with its awaiting caller if any.
#[derive(Debug)]
pub struct Resolved {
    /// The original request.
    pub request: Request,
    waiter: Option<Waiter>,
}

impl Resolved {
    /// Whether a caller is awaiting this request's outcome.
    pub fn is_awaited(&self) -> bool {
        self.waiter.is_some()
    }

    /// Deliver `outcome` to the awaiting caller.
    ///
    /// Returns the request and outcome back when nobody is awaiting them (or
    /// the caller went away), so they can be routed to handlers instead.
    pub fn settle(self, outcome: Outcome) -> Option<(Request, Outcome)> {
        match self.waiter {
            Some(tx) => match tx.send(outcome) {
                Ok(()) => None,
                Err(outcome) => Some((self.request, outcome)),
            },
            None => Some((self.request, outcome)),
        }
    }
}

/// Store of outstanding requests keyed by correlation id.
#[derive(Default)]
pub struct RequestTracker {
    ids: IdGenerator,
    pending: Mutex<HashMap<u64, Pending>>,
}

impl RequestTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request and return its id.
    ///
    /// Uses `explicit_id` when given, else a fresh generated id. Fails with
    /// [`HitbtcError::DuplicateId`] if `explicit_id` is outstanding.
    pub fn register(
        &self,
        method: impl Into<String>,
        params: Params,
        explicit_id: Option<u64>,
    ) -> Result<u64> {
        self.track(method.into(), params, explicit_id, None)
            .map(|req| req.id)
    }

    /// Register a request whose outcome will be sent to the returned receiver.
    pub fn register_awaiting(
        &self,
        method: impl Into<String>,
        params: Params,
        explicit_id: Option<u64>,
    ) -> Result<(u64, oneshot::Receiver<Outcome>)> {
        let (tx, rx) = oneshot::channel();
        let req = self.track(method.into(), params, explicit_id, Some(tx))?;
        Ok((req.id, rx))
    }

    /// Register a request and return a copy of what was stored.
    pub(crate) fn track(
        &self,
        method: String,
        params: Params,
        explicit_id: Option<u64>,
        waiter: Option<Waiter>,
    ) -> Result<Request> {
        let mut pending = self.lock();

        let id = match explicit_id {
            Some(id) if pending.contains_key(&id) => return Err(HitbtcError::DuplicateId(id)),
            Some(id) => id,
            None => loop {
                let id = self.ids.next_id();
                if !pending.contains_key(&id) {
                    break id;
                }
            },
        };

        let request = Request::new(id, method, params);
        pending.insert(
            id,
            Pending {
                request: request.clone(),
                waiter,
            },
        );
        Ok(request)
    }

    /// Remove and return the request with `id`.
    ///
    /// Fails with [`HitbtcError::UnknownRequestId`] if no such request is
    /// outstanding.
    pub fn resolve(&self, id: u64) -> Result<Resolved> {
        self.lock()
            .remove(&id)
            .map(|p| Resolved {
                request: p.request,
                waiter: p.waiter,
            })
            .ok_or(HitbtcError::UnknownRequestId(id))
    }

    /// Discard a request without notifying anyone.
    pub fn remove(&self, id: u64) -> Option<Request> {
        self.lock().remove(&id).map(|p| p.request)
    }

    /// Drain every outstanding request, ordered by id.
    pub fn fail_all(&self) -> Vec<Resolved> {
        let mut drained: Vec<Resolved> = self
            .lock()
            .drain()
            .map(|(_, p)| Resolved {
                request: p.request,
                waiter: p.waiter,
            })
            .collect();
        drained.sort_by_key(|r| r.request.id);
        drained
    }

    /// Whether `id` is outstanding.
    pub fn contains(&self, id: u64) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no request is outstanding.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
