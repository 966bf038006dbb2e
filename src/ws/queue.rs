//! Bounded queue of dispatched items for pull-based consumers.
//!
//! The read loop pushes without ever waiting: when the queue is full one item
//! is dropped according to [`DropPolicy`] and the drop is logged. Consumers
//! pull with [`DispatchQueue::recv`], which waits at most the given timeout.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::types::rpc::{Outcome, PushEvent, Request};

/// An item delivered through the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// A settled request with its outcome.
    Response {
        /// The original request.
        request: Request,
        /// How it was settled.
        outcome: Outcome,
    },
    /// A push event.
    Event(PushEvent),
}

/// What to discard when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPolicy {
    /// Discard the oldest queued item to make room.
    #[default]
    DropOldest,
    /// Discard the incoming item.
    DropNewest,
}

/// Bounded multi-producer queue with a timed `recv`.
#[derive(Debug)]
pub struct DispatchQueue {
    items: Mutex<VecDeque<Dispatched>>,
    capacity: usize,
    policy: DropPolicy,
    notify: Notify,
    dropped: AtomicU64,
}

impl DispatchQueue {
    /// Create a queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize, policy: DropPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            policy,
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an item without waiting.
    ///
    /// Returns the item that was discarded, if the queue was full.
    pub fn push(&self, item: Dispatched) -> Option<Dispatched> {
        let discarded = {
            let mut items = self.lock();
            if items.len() < self.capacity {
                items.push_back(item);
                None
            } else {
                match self.policy {
                    DropPolicy::DropOldest => {
                        let oldest = items.pop_front();
                        items.push_back(item);
                        oldest
                    }
                    DropPolicy::DropNewest => Some(item),
                }
            }
        };

        if let Some(ref lost) = discarded {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                capacity = self.capacity,
                policy = ?self.policy,
                dropped_total = total,
                item = %describe(lost),
                "Dispatch queue full, dropped item"
            );
        }

        self.notify.notify_one();
        discarded
    }

    /// Take the oldest item, if any.
    pub fn try_recv(&self) -> Option<Dispatched> {
        self.lock().pop_front()
    }

    /// Take the oldest item, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` when the timeout expires with the queue still empty.
    pub async fn recv(&self, timeout: Duration) -> Option<Dispatched> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.try_recv() {
                return Some(item);
            }
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return self.try_recv();
            }
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items discarded since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Dispatched>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn describe(item: &Dispatched) -> String {
    match item {
        Dispatched::Response { request, .. } => format!("response to {} #{}", request.method, request.id),
        Dispatched::Event(event) => format!("{} {}", event.method, event.symbol),
    }
}
