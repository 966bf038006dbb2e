//! Request wrappers for the HitBTC socket API.
//!
//! Each sub-module adds methods to [`HitbtcClient`](crate::HitbtcClient) via
//! `impl` blocks. They serialize their arguments into `params`, send the
//! request and return its correlation id; the response is delivered to the
//! handler registered for the method (or the catch-all handler, or the
//! dispatch queue). Every method accepts an optional custom id.
//!
//! ## Usage
//!
//! ```no_run
//! use hitbtc_ws::HitbtcClient;
//! use hitbtc_ws::types::rpc::{Outcome, Request};
//!
//! # #[tokio::main]
//! # async fn main() -> hitbtc_ws::Result<()> {
//! let client = HitbtcClient::builder().build()?;
//! client.on_response_for("getSymbol", |req: &Request, outcome: &Outcome| {
//!     println!("{} -> {:?}", req.id, outcome);
//! });
//! client.connect().await?;
//! client.get_symbol("ETHBTC", None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Methods | Description |
//! |---|---|---|
//! | [`market`] | 5 | Currencies, symbols, trade history |
//! | [`trading`] | 5 | Balance, active orders, place/cancel/replace |

pub mod market;
pub mod trading;
