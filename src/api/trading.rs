//! Trading requests. All of them require a logged-in session.

use crate::error::Result;
use crate::types::orders::{CancelOrder, NewOrder, ReplaceOrder};
use crate::types::rpc::Params;
use crate::types::to_params;
use crate::ws::client::HitbtcClient;

impl HitbtcClient {
    /// Request trading balances.
    ///
    /// **Method:** `getTradingBalance`
    pub fn get_trading_balance(&self, custom_id: Option<u64>) -> Result<u64> {
        self.send("getTradingBalance", Params::new(), custom_id)
    }

    /// Request the currently active orders.
    ///
    /// **Method:** `getOrders`
    pub fn get_active_orders(&self, custom_id: Option<u64>) -> Result<u64> {
        self.send("getOrders", Params::new(), custom_id)
    }

    /// Place a new order.
    ///
    /// **Method:** `newOrder`
    pub fn place_order(&self, order: &NewOrder, custom_id: Option<u64>) -> Result<u64> {
        self.send("newOrder", to_params(order)?, custom_id)
    }

    /// Cancel an order by its client order id.
    ///
    /// **Method:** `cancelOrder`
    pub fn cancel_order(&self, client_order_id: &str, custom_id: Option<u64>) -> Result<u64> {
        let cancel = CancelOrder {
            client_order_id: client_order_id.to_owned(),
        };
        self.send("cancelOrder", to_params(&cancel)?, custom_id)
    }

    /// Replace (cancel and re-place) an order.
    ///
    /// **Method:** `cancelReplaceOrder`
    pub fn replace_order(&self, replace: &ReplaceOrder, custom_id: Option<u64>) -> Result<u64> {
        self.send("cancelReplaceOrder", to_params(replace)?, custom_id)
    }
}
