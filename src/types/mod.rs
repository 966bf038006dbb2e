//! Request, response, and payload types for the HitBTC socket API.
//!
//! ## Organization
//!
//! - [`rpc`]: JSON-RPC envelopes: requests, responses, push events, outcomes
//! - [`enums`]: Shared enumerations (event kinds, order sides and types, …)
//! - [`subscription`]: Subscription intents replayed after every connect
//! - [`orders`]: Order placement, cancellation, replacement, and reports
//! - [`market`]: Trade queries and ticker payloads
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod enums;
pub mod market;
pub mod orders;
pub mod rpc;
pub mod subscription;

pub use enums::*;

use serde::Serialize;

use crate::error::{HitbtcError, Result};
use rpc::Params;

/// Serialize a typed request struct into a `params` object.
pub fn to_params<T: Serialize>(value: &T) -> Result<Params> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(HitbtcError::InvalidArgument(format!(
            "params must serialize to a JSON object, got {other}"
        ))),
    }
}
