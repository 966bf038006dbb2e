//! Market data types: trade queries and ticker payloads.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trades query
// ---------------------------------------------------------------------------

/// Parameters for the `getTrades` method.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesQuery {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// `"ASC"` or `"DESC"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// `"timestamp"` or `"id"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub till: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl TradesQuery {
    /// Query the most recent trades of `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Payload of a `ticker` push event.
///
/// Prices are decimal strings; any of them may be `null` on illiquid symbols.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    #[serde(default)]
    pub ask: Option<String>,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub volume_quote: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
