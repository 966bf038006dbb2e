//! Inbound frame classification and push method normalization.
//!
//! Every text frame is decoded into a [`Frame`]. Anything that is neither a
//! well-formed response nor a well-formed push event becomes
//! [`Frame::Malformed`] with a reason; classification never fails.

use serde_json::{Map, Value};

use crate::constants::{SNAPSHOT_PREFIX, UPDATE_PREFIX};
use crate::error::RpcError;
use crate::types::rpc::{Outcome, PushEvent, Response};

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Answer to one of our requests.
    Response(Response),
    /// Server-initiated event for a symbol.
    Push(PushEvent),
    /// Anything else, with the reason it was rejected.
    Malformed(String),
}

/// Map a push method to its canonical event name.
///
/// Strips one leading `snapshot` or `update` prefix and lowercases the rest:
/// `snapshotOrderbook` → `orderbook`, `updateTicker` → `ticker`,
/// `Trades` → `trades`.
pub fn normalize(method: &str) -> String {
    method
        .strip_prefix(SNAPSHOT_PREFIX)
        .or_else(|| method.strip_prefix(UPDATE_PREFIX))
        .unwrap_or(method)
        .to_lowercase()
}

/// Decode and classify a text frame.
pub fn decode(text: &str) -> Frame {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => classify(value),
        Err(e) => Frame::Malformed(format!("invalid JSON: {e}")),
    }
}

/// Classify a decoded JSON value.
pub fn classify(value: Value) -> Frame {
    let Value::Object(obj) = value else {
        return Frame::Malformed("frame is not a JSON object".into());
    };

    if !obj.contains_key("jsonrpc") {
        return Frame::Malformed("missing jsonrpc marker".into());
    }

    if obj.contains_key("result") || obj.contains_key("error") {
        return classify_response(obj);
    }

    classify_push(obj)
}

fn classify_response(mut obj: Map<String, Value>) -> Frame {
    let Some(id) = obj.get("id").and_then(Value::as_u64) else {
        return Frame::Malformed(format!(
            "response without integer id: {}",
            obj.get("id").unwrap_or(&Value::Null)
        ));
    };

    let outcome = match obj.remove("error") {
        Some(Value::Null) | None => Outcome::Success(obj.remove("result").unwrap_or(Value::Null)),
        Some(err) => match serde_json::from_value::<RpcError>(err) {
            Ok(err) => Outcome::Failure(err),
            Err(e) => {
                return Frame::Malformed(format!("response {id} has undecodable error: {e}"));
            }
        },
    };

    Frame::Response(Response { id, outcome })
}

fn classify_push(mut obj: Map<String, Value>) -> Frame {
    let raw_method = match obj.remove("method") {
        Some(Value::String(m)) => m,
        _ => return Frame::Malformed("push frame without method".into()),
    };
    let params = match obj.remove("params") {
        Some(Value::Object(p)) => p,
        _ => return Frame::Malformed(format!("{raw_method} push without params object")),
    };
    let Some(symbol) = params.get("symbol").and_then(Value::as_str).map(str::to_owned) else {
        return Frame::Malformed(format!("{raw_method} push without symbol"));
    };

    Frame::Push(PushEvent {
        method: normalize(&raw_method),
        raw_method,
        symbol,
        params,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_strips_lifecycle_prefixes() {
        assert_eq!(normalize("snapshotOrderbook"), "orderbook");
        assert_eq!(normalize("updateOrderbook"), "orderbook");
        assert_eq!(normalize("updateTicker"), "ticker");
        assert_eq!(normalize("snapshotCandles"), "candles");
        assert_eq!(normalize("Trades"), "trades");
        assert_eq!(normalize("ticker"), "ticker");
    }

    #[test]
    fn normalize_is_total() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("snapshot"), "");
        assert_eq!(normalize("update"), "");
        // Only one prefix is stripped.
        assert_eq!(normalize("snapshotUpdateX"), "updatex");
        // Prefix match is case-sensitive.
        assert_eq!(normalize("SnapshotOrderbook"), "snapshotorderbook");
    }

    #[test]
    fn classifies_success_response() {
        let frame = decode(r#"{"jsonrpc":"2.0","id":1,"result":true}"#);
        assert_eq!(
            frame,
            Frame::Response(Response {
                id: 1,
                outcome: Outcome::Success(json!(true)),
            })
        );
    }

    #[test]
    fn classifies_error_response() {
        let frame = decode(
            r#"{"jsonrpc":"2.0","id":9,"error":{"code":2001,"message":"Symbol not found","description":"Try get list of available symbols"}}"#,
        );
        let Frame::Response(Response {
            id,
            outcome: Outcome::Failure(err),
        }) = frame
        else {
            panic!("expected error response");
        };
        assert_eq!(id, 9);
        assert_eq!(err.code, 2001);
        assert_eq!(err.message, "Symbol not found");
    }

    #[test]
    fn classifies_push_event() {
        let frame = decode(
            r#"{"jsonrpc":"2.0","method":"updateTicker","params":{"symbol":"ETHBTC","ask":"100.5"}}"#,
        );
        let Frame::Push(event) = frame else {
            panic!("expected push event");
        };
        assert_eq!(event.raw_method, "updateTicker");
        assert_eq!(event.method, "ticker");
        assert_eq!(event.symbol, "ETHBTC");
        assert_eq!(event.params.get("ask"), Some(&json!("100.5")));
        assert!(!event.is_snapshot());
    }

    #[test]
    fn malformed_frames_are_not_fatal() {
        let cases = [
            "not json",
            "[1,2,3]",
            r#"{"id":1,"result":true}"#,
            r#"{"jsonrpc":"2.0","id":"abc","result":true}"#,
            r#"{"jsonrpc":"2.0","result":true}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":"nope"}"#,
            r#"{"jsonrpc":"2.0","params":{"symbol":"ETHBTC"}}"#,
            r#"{"jsonrpc":"2.0","method":"updateTicker"}"#,
            r#"{"jsonrpc":"2.0","method":"activeOrders","params":[]}"#,
            r#"{"jsonrpc":"2.0","method":"updateTicker","params":{"ask":"1"}}"#,
        ];
        for case in cases {
            assert!(
                matches!(decode(case), Frame::Malformed(_)),
                "{case} should be malformed"
            );
        }
    }

    #[test]
    fn null_error_is_treated_as_success() {
        let frame = decode(r#"{"jsonrpc":"2.0","id":4,"result":[],"error":null}"#);
        assert!(matches!(
            frame,
            Frame::Response(Response { id: 4, outcome: Outcome::Success(_) })
        ));
    }
}
