//! Constants for the HitBTC WebSocket API v2.
//!
//! Contains the endpoint URL, protocol markers, and the default values used
//! by [`ClientConfig`](crate::ws::client::ClientConfig). They are exported
//! for advanced usage.

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// WebSocket endpoint for the HitBTC streaming API v2.
pub const WS_API_URL: &str = "wss://api.hitbtc.com/api/2/ws";

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Method used to authenticate a session.
pub const LOGIN_METHOD: &str = "login";

/// Prefix of push methods that carry a full state snapshot.
pub const SNAPSHOT_PREFIX: &str = "snapshot";

/// Prefix of push methods that carry an incremental update.
pub const UPDATE_PREFIX: &str = "update";

/// Request ids are generated from a clock ticking at this many units per
/// second (100 µs resolution).
pub const ID_TICKS_PER_SECOND: i64 = 10_000;

// ---------------------------------------------------------------------------
// Client defaults
// ---------------------------------------------------------------------------

/// Client defaults.
pub mod defaults {
    /// Capacity of the pull-based dispatch queue.
    pub const QUEUE_CAPACITY: usize = 100;
    /// Timeout for awaited requests (milliseconds).
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
    /// First reconnect delay (milliseconds).
    pub const RECONNECT_INITIAL_DELAY_MS: u64 = 500;
    /// Upper bound for a single reconnect delay (milliseconds).
    pub const RECONNECT_MAX_DELAY_MS: u64 = 30_000;
    /// Growth factor between consecutive reconnect delays.
    pub const RECONNECT_FACTOR: f64 = 2.0;
    /// Fraction of each delay that is randomized.
    pub const RECONNECT_JITTER: f64 = 0.2;
    /// Retries after a failed attempt; the client gives up once this many
    /// retries in a row have also failed.
    pub const RECONNECT_MAX_RETRIES: u32 = 10;
    /// How long a session must stay active before a drop stops counting
    /// against the retry budget (milliseconds).
    pub const RECONNECT_STABLE_PERIOD_MS: u64 = 10_000;
}
