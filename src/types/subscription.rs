//! Subscription intents replayed on every (re)connect.

use serde_json::{Value, json};

use crate::types::enums::{CandlePeriod, EventKind};
use crate::types::rpc::Params;

/// A feed the client should be subscribed to while connected.
///
/// Two intents are equal when kind and params match; the client keeps at most
/// one copy of each.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// Which feed.
    pub kind: EventKind,
    /// Parameters of the `subscribe*` call (symbol, period, limit…).
    pub params: Params,
}

impl Subscription {
    /// Subscription with arbitrary parameters.
    pub fn new(kind: EventKind, params: Params) -> Self {
        Self { kind, params }
    }

    /// Ticker feed for `symbol`.
    pub fn ticker(symbol: impl Into<String>) -> Self {
        Self::with_symbol(EventKind::Ticker, symbol.into())
    }

    /// Order book feed for `symbol`.
    pub fn orderbook(symbol: impl Into<String>) -> Self {
        Self::with_symbol(EventKind::Orderbook, symbol.into())
    }

    /// Public trades feed for `symbol`.
    pub fn trades(symbol: impl Into<String>) -> Self {
        Self::with_symbol(EventKind::Trades, symbol.into())
    }

    /// Candles feed for `symbol` at `period`.
    pub fn candles(symbol: impl Into<String>, period: CandlePeriod) -> Self {
        let mut sub = Self::with_symbol(EventKind::Candles, symbol.into());
        sub.params.insert("period".into(), json!(period.as_str()));
        sub
    }

    /// Own order reports. Requires login.
    pub fn reports() -> Self {
        Self::new(EventKind::Reports, Params::new())
    }

    /// Add a parameter, e.g. `limit`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Method that starts this feed.
    pub fn subscribe_method(&self) -> &'static str {
        self.kind.subscribe_method()
    }

    /// Method that stops this feed.
    pub fn unsubscribe_method(&self) -> &'static str {
        self.kind.unsubscribe_method()
    }

    /// The symbol this intent targets, if any.
    pub fn symbol(&self) -> Option<&str> {
        self.params.get("symbol").and_then(Value::as_str)
    }

    fn with_symbol(kind: EventKind, symbol: String) -> Self {
        let mut params = Params::new();
        params.insert("symbol".into(), Value::String(symbol));
        Self { kind, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candles_carry_period() {
        let sub = Subscription::candles("ETHBTC", CandlePeriod::M30).param("limit", 100);
        assert_eq!(sub.subscribe_method(), "subscribeCandles");
        assert_eq!(sub.unsubscribe_method(), "unsubscribeCandles");
        assert_eq!(sub.params.get("period"), Some(&json!("M30")));
        assert_eq!(sub.params.get("limit"), Some(&json!(100)));
        assert_eq!(sub.symbol(), Some("ETHBTC"));
    }

    #[test]
    fn equal_intents_compare_equal() {
        assert_eq!(Subscription::ticker("ETHBTC"), Subscription::ticker("ETHBTC"));
        assert_ne!(Subscription::ticker("ETHBTC"), Subscription::trades("ETHBTC"));
        assert_ne!(Subscription::ticker("ETHBTC"), Subscription::ticker("BTCUSD"));
    }
}
