//! # hitbtc-ws
//!
//! A Rust client for the [HitBTC streaming API v2](https://api.hitbtc.com/#socket-api-reference)
//! (JSON-RPC over WebSocket).
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use hitbtc_ws::HitbtcClient;
//! use hitbtc_ws::types::subscription::Subscription;
//! use hitbtc_ws::ws::queue::Dispatched;
//!
//! #[tokio::main]
//! async fn main() -> hitbtc_ws::Result<()> {
//!     let client = HitbtcClient::connect_to(
//!         hitbtc_ws::constants::WS_API_URL,
//!         None,
//!         vec![Subscription::ticker("ETHBTC")],
//!     )
//!     .await?;
//!
//!     while let Some(item) = client.recv(Duration::from_secs(5)).await? {
//!         if let Dispatched::Event(event) = item {
//!             println!("{} {}", event.method, event.symbol);
//!         }
//!     }
//!     client.disconnect().await
//! }
//! ```

pub mod api;
pub mod constants;
pub mod error;
pub mod types;
pub mod ws;

/// Re-export the main client type at crate root for convenience.
pub use ws::client::HitbtcClient;
/// Re-export the error type and Result alias.
pub use error::{HitbtcError, Result};
