//! Binary to connect to the HitBTC streaming API, subscribe to the ETHBTC
//! ticker and print what arrives, for inspecting live data.
//!
//! # Usage
//!
//! ```sh
//! # Optional: log in and also stream order reports
//! export HITBTC_API_KEY="your-public-key"
//! export HITBTC_API_SECRET="your-secret-key"
//! cargo run --bin ws_check --features cli
//! ```

use std::time::Duration;

use hitbtc_ws::types::enums::EventKind;
use hitbtc_ws::types::market::Ticker;
use hitbtc_ws::types::orders::OrderReport;
use hitbtc_ws::types::rpc::{Outcome, PushEvent, Request};
use hitbtc_ws::types::subscription::Subscription;
use hitbtc_ws::ws::client::{ConnectionState, HitbtcClientBuilder};
use hitbtc_ws::ws::session::Credentials;
use hitbtc_ws::HitbtcError;
use tokio::time;

#[tokio::main]
async fn main() -> hitbtc_ws::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut builder = HitbtcClientBuilder::new()
        .subscription(Subscription::ticker("ETHBTC"))
        .disable_queue();

    match Credentials::from_env("HITBTC_API_KEY", "HITBTC_API_SECRET") {
        Some(credentials) => {
            println!("Credentials found, logging in and subscribing to reports…");
            builder = builder
                .credentials(credentials)
                .subscription(Subscription::reports());
        }
        None => println!("No credentials set, public feeds only"),
    }

    let client = builder.build()?;

    client.on_response(|req: &Request, outcome: &Outcome| match outcome {
        Outcome::Success(result) => println!("{} #{} -> {result}", req.method, req.id),
        other => println!("{} #{} -> {other:?}", req.method, req.id),
    });
    client.on_feed(EventKind::Ticker, |event: &PushEvent| match event.parse::<Ticker>() {
        Ok(t) => println!(
            "{} ask={:?} bid={:?} last={:?}",
            t.symbol, t.ask, t.bid, t.last
        ),
        Err(e) => eprintln!("Bad ticker payload: {e}"),
    });
    client.on_feed(EventKind::Reports, |event: &PushEvent| {
        match event.parse::<OrderReport>() {
            Ok(r) => println!("{:#?}", r),
            Err(e) => eprintln!("Bad report payload: {e}"),
        }
    });
    client.on_unknown_event(|event: &PushEvent| {
        println!("{} for {}", event.raw_method, event.symbol);
    });
    client.on_error(|e: &HitbtcError| eprintln!("Error: {e}"));

    println!("Connecting to HitBTC WebSocket…");
    client.connect().await?;
    if !client
        .wait_for_state(ConnectionState::Active, Duration::from_secs(10))
        .await
    {
        eprintln!("Session did not become active within 10 seconds");
    }

    println!("Listening for events for 10 seconds…\n");
    time::sleep(Duration::from_secs(10)).await;

    println!("\n10 seconds elapsed, disconnecting…");
    client.disconnect().await?;
    println!("Done.");

    Ok(())
}
