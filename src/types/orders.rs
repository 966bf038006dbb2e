//! Order placement, cancellation, and replacement types.

use serde::{Deserialize, Serialize};

use crate::types::enums::*;

// ---------------------------------------------------------------------------
// New Order
// ---------------------------------------------------------------------------

/// Parameters for the `newOrder` method.
///
/// Quantities and prices are decimal strings, as the API expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    /// Required for [`TimeInForce::Gtd`] orders (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_validate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_only: Option<bool>,
}

impl NewOrder {
    /// A limit order with every optional field unset.
    pub fn limit(
        client_order_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            client_order_id: client_order_id.into(),
            symbol: symbol.into(),
            side,
            order_type: Some(OrderType::Limit),
            time_in_force: None,
            quantity: quantity.into(),
            price: Some(price.into()),
            stop_price: None,
            expire_time: None,
            strict_validate: None,
            post_only: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Cancel / Replace
// ---------------------------------------------------------------------------

/// Parameters for the `cancelOrder` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrder {
    pub client_order_id: String,
}

/// Parameters for the `cancelReplaceOrder` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOrder {
    /// Id of the order being replaced.
    pub client_order_id: String,
    /// Id assigned to the replacement order.
    pub request_client_id: String,
    pub quantity: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_validate: Option<bool>,
}

// ---------------------------------------------------------------------------
// Order Report
// ---------------------------------------------------------------------------

/// An order as returned by order methods and pushed by the report feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    #[serde(default)]
    pub id: Option<String>,
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub cum_quantity: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// `"new"`, `"trade"`, `"canceled"`, … on report pushes.
    #[serde(default)]
    pub report_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_order_skips_unset_fields() {
        let order = NewOrder::limit("57d5525562c945448e3cbd559bd068c4", "ETHBTC", Side::Sell, "0.063", "0.046016");
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(
            value,
            json!({
                "clientOrderId": "57d5525562c945448e3cbd559bd068c4",
                "symbol": "ETHBTC",
                "side": "sell",
                "type": "limit",
                "quantity": "0.063",
                "price": "0.046016"
            })
        );
    }

    #[test]
    fn order_report_parses_push_payload() {
        let report: OrderReport = serde_json::from_value(json!({
            "id": "4345697765",
            "clientOrderId": "53b7cf917963464a811a4af426102c19",
            "symbol": "ETHBTC",
            "side": "sell",
            "status": "filled",
            "type": "limit",
            "timeInForce": "GTC",
            "quantity": "0.001",
            "price": "0.053868",
            "cumQuantity": "0.001",
            "createdAt": "2017-10-20T12:20:05.952Z",
            "updatedAt": "2017-10-20T12:20:38.708Z",
            "reportType": "trade"
        }))
        .unwrap();
        assert_eq!(report.side, Side::Sell);
        assert_eq!(report.time_in_force, Some(TimeInForce::Gtc));
        assert_eq!(report.report_type.as_deref(), Some("trade"));
    }
}
