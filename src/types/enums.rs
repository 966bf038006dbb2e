//! Shared enum types that map directly to HitBTC API string values.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event Kind
// ---------------------------------------------------------------------------

/// A push feed that can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Best bid/ask and 24h statistics.
    Ticker,
    /// Order book snapshots and deltas.
    Orderbook,
    /// Public trades.
    Trades,
    /// OHLC candles.
    Candles,
    /// Own order execution reports (requires login).
    Reports,
}

impl EventKind {
    /// All kinds, in subscription order.
    pub const ALL: [EventKind; 5] = [
        Self::Ticker,
        Self::Orderbook,
        Self::Trades,
        Self::Candles,
        Self::Reports,
    ];

    /// Method used to start the feed.
    pub fn subscribe_method(self) -> &'static str {
        match self {
            Self::Ticker => "subscribeTicker",
            Self::Orderbook => "subscribeOrderbook",
            Self::Trades => "subscribeTrades",
            Self::Candles => "subscribeCandles",
            Self::Reports => "subscribeReports",
        }
    }

    /// Method used to stop the feed.
    pub fn unsubscribe_method(self) -> &'static str {
        match self {
            Self::Ticker => "unsubscribeTicker",
            Self::Orderbook => "unsubscribeOrderbook",
            Self::Trades => "unsubscribeTrades",
            Self::Candles => "unsubscribeCandles",
            Self::Reports => "unsubscribeReports",
        }
    }

    /// Canonical name of the push events this feed produces.
    ///
    /// Report feeds push `report` events per order.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Orderbook => "orderbook",
            Self::Trades => "trades",
            Self::Candles => "candles",
            Self::Reports => "report",
        }
    }

    /// Look up a kind by canonical push event name.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.canonical_name() == name)
    }
}

// ---------------------------------------------------------------------------
// Auth Algorithm
// ---------------------------------------------------------------------------

/// Login algorithm sent as the `algo` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthAlgo {
    /// Pre-shared secret key sent in clear.
    BASIC,
    /// HMAC-SHA256 signature over a nonce.
    HS256,
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Buy or sell side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

// ---------------------------------------------------------------------------
// Order Type
// ---------------------------------------------------------------------------

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    Limit,
    Market,
    StopLimit,
    StopMarket,
}

// ---------------------------------------------------------------------------
// Time In Force
// ---------------------------------------------------------------------------

/// Order time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled.
    #[serde(rename = "GTC")]
    Gtc,
    /// Immediate or cancel.
    #[serde(rename = "IOC")]
    Ioc,
    /// Fill or kill.
    #[serde(rename = "FOK")]
    Fok,
    /// Good for the trading day.
    Day,
    /// Good till `expireTime`.
    #[serde(rename = "GTD")]
    Gtd,
}

// ---------------------------------------------------------------------------
// Candle Period
// ---------------------------------------------------------------------------

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandlePeriod {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    D7,
    /// One month.
    #[serde(rename = "1M")]
    Month1,
}

impl CandlePeriod {
    /// Wire value, e.g. `"M30"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M3 => "M3",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
            Self::D7 => "D7",
            Self::Month1 => "1M",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_canonical(kind.canonical_name()), Some(kind));
        }
        assert_eq!(EventKind::from_canonical("activeorders"), None);
    }

    #[test]
    fn wire_values() {
        assert_eq!(serde_json::to_string(&OrderType::StopLimit).unwrap(), "\"stopLimit\"");
        assert_eq!(serde_json::to_string(&TimeInForce::Gtc).unwrap(), "\"GTC\"");
        assert_eq!(serde_json::to_string(&TimeInForce::Day).unwrap(), "\"Day\"");
        assert_eq!(serde_json::to_string(&CandlePeriod::Month1).unwrap(), "\"1M\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"sell\"");
    }
}
