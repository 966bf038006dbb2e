//! WebSocket streaming layer.
//!
//! HitBTC speaks JSON-RPC over a single websocket. Requests carry a numeric
//! `id`; the server answers each with a `result` or `error` frame echoing the
//! id, and pushes market data and order reports as id-less frames whose
//! `method` names the feed (`snapshotOrderbook`, `updateTicker`, ...).
//!
//! ## Modules
//!
//! - [`tracker`]: correlation id allocation and outstanding requests
//! - [`frame`]: classification of inbound frames and push method
//!   normalization (`updateTicker` → `ticker`)
//! - [`dispatch`]: routing to awaiting callers, handlers and the queue
//! - [`queue`]: bounded pull queue with a drop policy
//! - [`session`]: credentials, login and subscription replay
//! - [`backoff`]: reconnect timing and retry budget
//! - [`client`]: the [`HitbtcClient`](client::HitbtcClient) owning the connection
//!
//! ## Ordering
//!
//! Frames are dispatched one at a time in arrival order on the connection
//! task. `send` may be called concurrently from any task.

pub mod backoff;
pub mod client;
pub mod dispatch;
pub mod frame;
pub mod queue;
pub mod session;
pub mod tracker;
