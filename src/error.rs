//! Error types for the `hitbtc-ws` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, HitbtcError>`.
//!
//! [`HitbtcError`] covers:
//! - **Protocol errors**: malformed frames, responses for unknown request ids
//! - **Server errors**: the `error` object of a JSON-RPC response
//! - **Connection errors**: lost transport, exhausted reconnect budget, not connected
//! - **Caller errors**: duplicate request ids, missing credentials, bad arguments
//! - **JSON / WebSocket / URL errors**: wrapped library failures

use std::fmt;
use std::time::Duration;

/// Error object carried by a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RpcError {
    /// HitBTC error code (e.g. `1002` for "Authorization required").
    pub code: i64,
    /// Short error message.
    pub message: String,
    /// Longer explanation. Not every error carries one.
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.message)?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

/// All possible errors produced by the `hitbtc-ws` client.
#[derive(Debug, thiserror::Error)]
pub enum HitbtcError {
    /// The server answered a request with an `error` object.
    #[error("server error: {0}")]
    Server(RpcError),

    /// An inbound frame could not be classified as a response or push event.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A response referenced an id with no outstanding request.
    #[error("response for unknown request id {0}")]
    UnknownRequestId(u64),

    /// A request with this explicit id is already outstanding.
    #[error("request id {0} is already outstanding")]
    DuplicateId(u64),

    /// Login was attempted without a usable key/secret pair.
    #[error("credentials missing: {0}")]
    CredentialsMissing(&'static str),

    /// The connection dropped before a response arrived.
    #[error("connection lost before a response was received")]
    TransportLost,

    /// The client was disconnected while the request was outstanding.
    #[error("request cancelled: client disconnected")]
    Cancelled,

    /// Every reconnect attempt allowed by the policy failed.
    #[error("connection unavailable after {attempts} attempts")]
    ConnectionUnavailable {
        /// Number of consecutive failed connection attempts.
        attempts: u32,
    },

    /// `send` was called while no connection is open.
    #[error("not connected")]
    NotConnected,

    /// An awaited request got no response in time.
    #[error("request {id} timed out after {timeout:?}")]
    Timeout {
        /// The request id that timed out.
        id: u64,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A WebSocket-level error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// An error parsing the endpoint URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HitbtcError>;
