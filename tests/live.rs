//! Smoke tests against the real HitBTC endpoint (`wss://api.hitbtc.com/api/2/ws`).
//!
//! # Running
//!
//! These tests open a real network connection. Enable them explicitly:
//!
//! ```sh
//! export HITBTC_LIVE=1
//! # Optional, enables the authenticated tests
//! export HITBTC_API_KEY="your-public-key"
//! export HITBTC_API_SECRET="your-secret-key"
//! cargo test --test live -- --nocapture
//! ```
//!
//! Without `HITBTC_LIVE=1`, every test is silently skipped.

use std::time::Duration;

use hitbtc_ws::error::HitbtcError;
use hitbtc_ws::types::rpc::{Params, PushEvent};
use hitbtc_ws::types::subscription::Subscription;
use hitbtc_ws::ws::client::{ConnectionState, HitbtcClient, HitbtcClientBuilder};
use hitbtc_ws::ws::session::Credentials;
use serde_json::json;
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(15);

fn live_enabled() -> bool {
    std::env::var("HITBTC_LIVE").is_ok_and(|v| v == "1")
}

/// Macro to skip a test when live tests are not enabled.
macro_rules! require_live {
    () => {
        if !live_enabled() {
            eprintln!("⏭  Skipped (HITBTC_LIVE not set)");
            return;
        }
    };
}

/// Macro to skip a test when credentials are missing.
macro_rules! require_credentials {
    () => {
        match Credentials::from_env("HITBTC_API_KEY", "HITBTC_API_SECRET") {
            Some(c) => c,
            None => {
                eprintln!("⏭  Skipped (HITBTC_API_KEY / HITBTC_API_SECRET not set)");
                return;
            }
        }
    };
}

async fn connected(builder: HitbtcClientBuilder) -> HitbtcClient {
    let client = builder.build().expect("valid config");
    client.connect().await.expect("connect failed");
    assert!(
        client.wait_for_state(ConnectionState::Active, WAIT).await,
        "session did not become active"
    );
    client
}

// ===================================================================
// Public data
// ===================================================================

#[tokio::test]
async fn test_get_symbol() {
    require_live!();
    let client = connected(HitbtcClientBuilder::new()).await;

    let mut params = Params::new();
    params.insert("symbol".into(), json!("ETHBTC"));
    let symbol = client
        .request("getSymbol", params)
        .await
        .expect("getSymbol failed");
    assert_eq!(symbol["id"], "ETHBTC");
    assert_eq!(symbol["baseCurrency"], "ETH");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_unknown_symbol_is_server_error() {
    require_live!();
    let client = connected(HitbtcClientBuilder::new()).await;

    let mut params = Params::new();
    params.insert("symbol".into(), json!("NOSUCHSYMBOL"));
    match client.request("getSymbol", params).await {
        Err(HitbtcError::Server(err)) => assert!(err.code > 0, "{err}"),
        other => panic!("expected server error, got {other:?}"),
    }

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_ticker_stream() {
    require_live!();
    let builder = HitbtcClientBuilder::new().subscription(Subscription::ticker("ETHBTC"));
    let client = builder.build().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_push_event("ticker", move |e: &PushEvent| {
        let _ = tx.send(e.clone());
    });
    client.connect().await.unwrap();

    let event = tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no ticker in time")
        .expect("handler dropped");
    assert_eq!(event.symbol, "ETHBTC");
    assert!(event.params.contains_key("ask"));

    client.disconnect().await.unwrap();
}

// ===================================================================
// Authenticated
// ===================================================================

#[tokio::test]
async fn test_login_and_balance() {
    require_live!();
    let credentials = require_credentials!();
    let client = connected(HitbtcClientBuilder::new()).await;

    client.login(&credentials).await.expect("login failed");
    let balance = client
        .request("getTradingBalance", Params::new())
        .await
        .expect("getTradingBalance failed");
    assert!(balance.is_array());

    client.disconnect().await.unwrap();
}
