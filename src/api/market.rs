//! Public market data requests: currencies, symbols, trades.

use serde_json::json;

use crate::error::Result;
use crate::types::market::TradesQuery;
use crate::types::rpc::Params;
use crate::types::to_params;
use crate::ws::client::HitbtcClient;

impl HitbtcClient {
    /// Request one currency's details.
    ///
    /// **Method:** `getCurrency`
    pub fn get_currency(&self, currency: &str, custom_id: Option<u64>) -> Result<u64> {
        self.send("getCurrency", single("currency", currency), custom_id)
    }

    /// Request all currencies.
    ///
    /// **Method:** `getCurrencies`
    pub fn get_currencies(&self, custom_id: Option<u64>) -> Result<u64> {
        self.send("getCurrencies", Params::new(), custom_id)
    }

    /// Request one trading symbol's details (tick size, fees, ...).
    ///
    /// **Method:** `getSymbol`
    pub fn get_symbol(&self, symbol: &str, custom_id: Option<u64>) -> Result<u64> {
        self.send("getSymbol", single("symbol", symbol), custom_id)
    }

    /// Request all trading symbols.
    ///
    /// **Method:** `getSymbols`
    pub fn get_symbols(&self, custom_id: Option<u64>) -> Result<u64> {
        self.send("getSymbols", Params::new(), custom_id)
    }

    /// Request public trade history.
    ///
    /// **Method:** `getTrades`
    pub fn get_trades(&self, query: &TradesQuery, custom_id: Option<u64>) -> Result<u64> {
        self.send("getTrades", to_params(query)?, custom_id)
    }
}

fn single(key: &str, value: &str) -> Params {
    let mut params = Params::new();
    params.insert(key.to_owned(), json!(value));
    params
}
