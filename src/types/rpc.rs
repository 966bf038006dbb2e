//! JSON-RPC envelope types exchanged over the socket.
//!
//! Outbound requests are serialized as `{"method", "params", "id"}`. Inbound
//! frames are classified by [`crate::ws::frame`] into [`Response`]s and
//! [`PushEvent`]s before they reach any handler.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HitbtcError, Result, RpcError};
use crate::types::enums::EventKind;

/// Parameters of a request or push event: always a JSON object.
pub type Params = Map<String, Value>;

/// An outbound request, tracked until its response arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// JSON-RPC method, e.g. `"subscribeTicker"`.
    pub method: String,
    /// Named parameters.
    pub params: Params,
    /// Correlation id.
    pub id: u64,
}

impl Request {
    /// Build a request.
    pub fn new(id: u64, method: impl Into<String>, params: Params) -> Self {
        Self {
            method: method.into(),
            params,
            id,
        }
    }

    /// The `symbol` parameter, when the request has one.
    pub fn symbol(&self) -> Option<&str> {
        self.params.get("symbol").and_then(Value::as_str)
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How a request was settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server answered with `result`.
    Success(Value),
    /// The server answered with `error`.
    Failure(RpcError),
    /// The connection dropped first.
    TransportLost,
    /// The client was disconnected first.
    Cancelled,
}

impl Outcome {
    /// Whether the server accepted the request.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a `Result`, mapping every non-success to its error.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(err) => Err(HitbtcError::Server(err)),
            Self::TransportLost => Err(HitbtcError::TransportLost),
            Self::Cancelled => Err(HitbtcError::Cancelled),
        }
    }
}

/// An inbound response to one of our requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Id of the request being answered.
    pub id: u64,
    /// Either [`Outcome::Success`] or [`Outcome::Failure`].
    pub outcome: Outcome,
}

/// A server-initiated event for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    /// Method as received, e.g. `"snapshotOrderbook"`.
    pub raw_method: String,
    /// Canonical method with any snapshot/update prefix removed, e.g. `"orderbook"`.
    pub method: String,
    /// Subject symbol, e.g. `"ETHBTC"`.
    pub symbol: String,
    /// Full `params` object, `symbol` included.
    pub params: Params,
}

impl PushEvent {
    /// Whether the event carries a full snapshot rather than a delta.
    pub fn is_snapshot(&self) -> bool {
        self.raw_method.starts_with(crate::constants::SNAPSHOT_PREFIX)
    }

    /// The feed this event belongs to, when it is a known one.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_canonical(&self.method)
    }

    /// Decode `params` into a typed payload such as
    /// [`Ticker`](crate::types::market::Ticker) or
    /// [`OrderReport`](crate::types::orders::OrderReport).
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.params.clone()))?)
    }
}
