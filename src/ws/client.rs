//! Streaming client for the HitBTC WebSocket API.
//!
//! One [`HitbtcClient`] owns one logical connection. A background Tokio task
//! connects, runs the session bootstrap (login and subscription replay), pumps
//! inbound frames through the [`Dispatcher`], writes outbound requests, and
//! reconnects with bounded backoff when the transport drops.
//!
//! ```text
//!   Disconnected ──open──▶ Bootstrapping ──login/replay──▶ Active
//!        ▲                       │                          │
//!        └──────── transport lost (reconnect) ◀─────────────┘
//!
//!   any state ──disconnect()/budget exhausted──▶ Terminated
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use hitbtc_ws::types::rpc::PushEvent;
//! use hitbtc_ws::types::subscription::Subscription;
//! use hitbtc_ws::ws::client::HitbtcClientBuilder;
//!
//! # #[tokio::main]
//! # async fn main() -> hitbtc_ws::error::Result<()> {
//! let client = HitbtcClientBuilder::new()
//!     .subscription(Subscription::ticker("ETHBTC"))
//!     .build()?;
//!
//! client.on_push_event("ticker", |event: &PushEvent| {
//!     println!("{} ask={}", event.symbol, event.params["ask"]);
//! });
//!
//! client.connect().await?;
//! tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::constants::{WS_API_URL, defaults};
use crate::error::{HitbtcError, Result};
use crate::types::enums::EventKind;
use crate::types::rpc::{Outcome, Params};
use crate::types::subscription::Subscription;

use super::backoff::ReconnectPolicy;
use super::dispatch::{Dispatcher, ErrorHandler, PushEventHandler, ResponseHandler};
use super::queue::{DispatchQueue, Dispatched, DropPolicy};
use super::session::{self, Credentials, SessionLink};
use super::tracker::RequestTracker;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Lifecycle state of the client's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport. Either not started yet or waiting to reconnect.
    Disconnected,
    /// Transport open; login and subscription replay in progress.
    Bootstrapping,
    /// Bootstrap finished.
    Active,
    /// Stopped for good, by `disconnect()` or an exhausted reconnect budget.
    Terminated,
}

impl ConnectionState {
    /// Whether requests can be sent.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Bootstrapping | Self::Active)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`HitbtcClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Credentials used to log in on every (re)connect.
    pub credentials: Option<Credentials>,
    /// Feeds subscribed on every (re)connect.
    pub subscriptions: Vec<Subscription>,
    /// Capacity of the dispatch queue; `None` disables it.
    pub queue_capacity: Option<usize>,
    /// What the full queue discards.
    pub drop_policy: DropPolicy,
    /// How long awaited requests wait for a response.
    pub request_timeout: Duration,
    /// Whether to reconnect after an established connection drops.
    pub auto_reconnect: bool,
    /// Reconnect timing and retry budget.
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: WS_API_URL.to_owned(),
            credentials: None,
            subscriptions: Vec::new(),
            queue_capacity: Some(defaults::QUEUE_CAPACITY),
            drop_policy: DropPolicy::default(),
            request_timeout: Duration::from_millis(defaults::REQUEST_TIMEOUT_MS),
            auto_reconnect: true,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`HitbtcClient`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use hitbtc_ws::ws::client::HitbtcClientBuilder;
/// use hitbtc_ws::ws::session::Credentials;
///
/// let client = HitbtcClientBuilder::new()
///     .credentials(Credentials::signature("public", "secret"))
///     .request_timeout(Duration::from_secs(10))
///     .queue_capacity(1_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct HitbtcClientBuilder {
    config: ClientConfig,
}

impl HitbtcClientBuilder {
    /// Start from [`ClientConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint. Default: [`WS_API_URL`].
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Log in with these credentials on every (re)connect.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Add a subscription intent.
    pub fn subscription(mut self, subscription: Subscription) -> Self {
        self.config.subscriptions.push(subscription);
        self
    }

    /// Add several subscription intents.
    pub fn subscriptions(mut self, subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        self.config.subscriptions.extend(subscriptions);
        self
    }

    /// Set the dispatch queue capacity. Default: 100.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    /// Disable the dispatch queue; unhandled items are logged and dropped.
    pub fn disable_queue(mut self) -> Self {
        self.config.queue_capacity = None;
        self
    }

    /// Set what the full queue discards. Default: the oldest item.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.config.drop_policy = policy;
        self
    }

    /// Set the awaited request timeout. Default: 30 s.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Enable or disable reconnecting after a drop. Default: true.
    pub fn auto_reconnect(mut self, enable: bool) -> Self {
        self.config.auto_reconnect = enable;
        self
    }

    /// Set the reconnect policy.
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.config.reconnect = policy;
        self
    }

    /// Validate the configuration and build the client. Does not connect.
    pub fn build(self) -> Result<HitbtcClient> {
        HitbtcClient::new(self.config)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Streaming HitBTC client.
///
/// Cheap operations (`send`, handler registration, `subscribe`) are
/// synchronous and may be called from any task. Handlers run on the
/// connection task in frame arrival order.
pub struct HitbtcClient {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    url: Url,
    credentials: Option<Credentials>,
    request_timeout: Duration,
    auto_reconnect: bool,
    reconnect: ReconnectPolicy,
    subscriptions: Mutex<Vec<Subscription>>,
    dispatcher: Dispatcher,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Sender<bool>,
    generation: AtomicU64,
}

enum Ended {
    Shutdown,
    Lost,
}

impl HitbtcClient {
    /// Create a client from `config`. Does not connect.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(HitbtcError::InvalidArgument(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        if config.request_timeout.is_zero() {
            return Err(HitbtcError::InvalidArgument(
                "request timeout must be > 0".into(),
            ));
        }
        config.reconnect.validate()?;

        let mut subscriptions: Vec<Subscription> = Vec::new();
        for sub in config.subscriptions {
            if !subscriptions.contains(&sub) {
                subscriptions.push(sub);
            }
        }

        let queue = config
            .queue_capacity
            .map(|capacity| Arc::new(DispatchQueue::new(capacity, config.drop_policy)));

        let inner = Inner {
            url,
            credentials: config.credentials,
            request_timeout: config.request_timeout,
            auto_reconnect: config.auto_reconnect,
            reconnect: config.reconnect,
            subscriptions: Mutex::new(subscriptions),
            dispatcher: Dispatcher::new(Arc::new(RequestTracker::new()), queue),
            outbound: Mutex::new(None),
            state: watch::channel(ConnectionState::Disconnected).0,
            shutdown: watch::channel(false).0,
            generation: AtomicU64::new(0),
        };

        Ok(Self {
            inner: Arc::new(inner),
            task: Mutex::new(None),
        })
    }

    /// Builder with default configuration.
    pub fn builder() -> HitbtcClientBuilder {
        HitbtcClientBuilder::new()
    }

    /// Build a client for `url` and connect it.
    pub async fn connect_to(
        url: impl Into<String>,
        credentials: Option<Credentials>,
        subscriptions: Vec<Subscription>,
    ) -> Result<Self> {
        let client = Self::new(ClientConfig {
            url: url.into(),
            credentials,
            subscriptions,
            ..ClientConfig::default()
        })?;
        client.connect().await?;
        Ok(client)
    }

    // -- lifecycle -----------------------------------------------------------

    /// Start the connection task and wait until the transport is open.
    ///
    /// Login and subscription replay continue in the background; use
    /// [`wait_for_state`](Self::wait_for_state) to wait for
    /// [`ConnectionState::Active`]. Fails with
    /// [`HitbtcError::ConnectionUnavailable`] if the reconnect budget runs out
    /// before the first connection succeeds.
    pub async fn connect(&self) -> Result<()> {
        let ready = {
            let mut task = lock(&self.task);
            if self.inner.state() == ConnectionState::Terminated {
                return Err(HitbtcError::InvalidArgument(
                    "client has been disconnected".into(),
                ));
            }
            if task.as_ref().is_some_and(|t| !t.is_finished()) {
                return Err(HitbtcError::InvalidArgument("client already started".into()));
            }

            let (tx, rx) = oneshot::channel();
            let shutdown = self.inner.shutdown.subscribe();
            *task = Some(tokio::spawn(Arc::clone(&self.inner).run(shutdown, tx)));
            rx
        };

        ready.await.unwrap_or(Err(HitbtcError::Cancelled))
    }

    /// Stop the client for good.
    ///
    /// Closes the transport, fails every outstanding request with
    /// [`Outcome::Cancelled`] and suppresses reconnects. The client cannot be
    /// connected again.
    pub async fn disconnect(&self) -> Result<()> {
        self.inner.shutdown.send_replace(true);

        let task = lock(&self.task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Connection task panicked");
                }
            }
        }

        // Covers a client that was never connected.
        if self.inner.state() != ConnectionState::Terminated {
            self.inner.terminate();
        }
        Ok(())
    }

    /// Alias for [`disconnect`](Self::disconnect).
    pub async fn stop(&self) -> Result<()> {
        self.disconnect().await
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Receiver notified on every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Wait up to `timeout` for the connection to reach `target`.
    pub async fn wait_for_state(&self, target: ConnectionState, timeout: Duration) -> bool {
        let mut rx = self.inner.state.subscribe();
        matches!(
            tokio::time::timeout(timeout, rx.wait_for(|state| *state == target)).await,
            Ok(Ok(_))
        )
    }

    // -- requests ------------------------------------------------------------

    /// Send a request without waiting for its response.
    ///
    /// The request is tracked before it is written; its response goes to the
    /// registered response handlers or the queue. Uses `custom_id` when given.
    /// Fails with [`HitbtcError::NotConnected`] unless the transport is open
    /// and with [`HitbtcError::DuplicateId`] if `custom_id` is outstanding.
    pub fn send(&self, method: &str, params: Params, custom_id: Option<u64>) -> Result<u64> {
        self.inner.submit(method, params, custom_id, None)
    }

    /// Send a request and wait for its result.
    ///
    /// Resolves with the `result` value, or fails with
    /// [`HitbtcError::Server`], [`HitbtcError::TransportLost`],
    /// [`HitbtcError::Cancelled`] or [`HitbtcError::Timeout`].
    pub async fn request(&self, method: &str, params: Params) -> Result<Value> {
        SessionLink::request(&*self.inner, method, params).await
    }

    /// Log in on the current connection and wait for the result.
    ///
    /// The credentials are not kept; configure them on the builder to log in
    /// again after a reconnect.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        session::login(&*self.inner, credentials).await
    }

    /// Number of requests awaiting a response.
    pub fn outstanding(&self) -> usize {
        self.inner.dispatcher.tracker().len()
    }

    // -- subscriptions -------------------------------------------------------

    /// Record a subscription intent and send it if connected.
    ///
    /// Returns the request id, or `None` when the intent was already recorded
    /// or the client is not connected (it will be sent on the next connect).
    pub fn subscribe(&self, subscription: Subscription) -> Result<Option<u64>> {
        {
            let mut subs = self.inner.subscriptions();
            if subs.contains(&subscription) {
                return Ok(None);
            }
            subs.push(subscription.clone());
        }
        self.send_if_open(subscription.subscribe_method(), subscription.params)
    }

    /// Forget a subscription intent and send the matching unsubscribe if
    /// connected.
    pub fn unsubscribe(&self, subscription: Subscription) -> Result<Option<u64>> {
        self.inner.subscriptions().retain(|s| *s != subscription);
        self.send_if_open(subscription.unsubscribe_method(), subscription.params)
    }

    /// Currently recorded subscription intents.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.inner.subscriptions().clone()
    }

    fn send_if_open(&self, method: &str, params: Params) -> Result<Option<u64>> {
        match self.inner.submit(method, params, None, None) {
            Ok(id) => Ok(Some(id)),
            Err(HitbtcError::NotConnected) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // -- handlers ------------------------------------------------------------

    /// Handler for responses with no method-specific handler.
    pub fn on_response<H: ResponseHandler + 'static>(&self, handler: H) {
        self.inner.dispatcher.on_response(handler);
    }

    /// Handler for responses to requests sent with `method`.
    pub fn on_response_for<H: ResponseHandler + 'static>(&self, method: &str, handler: H) {
        self.inner.dispatcher.on_response_for(method, handler);
    }

    /// Handler for push events of one canonical method (`"ticker"`,
    /// `"orderbook"`, `"trades"`, `"candles"`, `"report"`).
    pub fn on_push_event<H: PushEventHandler + 'static>(&self, method: &str, handler: H) {
        self.inner.dispatcher.on_push_event(method, handler);
    }

    /// Handler for the push events of one subscription kind.
    pub fn on_feed<H: PushEventHandler + 'static>(&self, kind: EventKind, handler: H) {
        self.inner
            .dispatcher
            .on_push_event(kind.canonical_name(), handler);
    }

    /// Handler for push events with no method-specific handler; takes them
    /// ahead of the queue.
    pub fn on_unknown_event<H: PushEventHandler + 'static>(&self, handler: H) {
        self.inner.dispatcher.on_unknown_event(handler);
    }

    /// Handler for non-fatal errors.
    pub fn on_error<H: ErrorHandler + 'static>(&self, handler: H) {
        self.inner.dispatcher.on_error(handler);
    }

    // -- queue ---------------------------------------------------------------

    /// Take the next queued item, waiting up to `timeout`.
    ///
    /// `Ok(None)` means the timeout expired. Fails with
    /// [`HitbtcError::InvalidArgument`] if the queue is disabled.
    pub async fn recv(&self, timeout: Duration) -> Result<Option<Dispatched>> {
        Ok(self.queue()?.recv(timeout).await)
    }

    /// Take the next queued item without waiting.
    pub fn try_recv(&self) -> Result<Option<Dispatched>> {
        Ok(self.queue()?.try_recv())
    }

    fn queue(&self) -> Result<&Arc<DispatchQueue>> {
        self.inner
            .dispatcher
            .queue()
            .ok_or_else(|| HitbtcError::InvalidArgument("dispatch queue is disabled".into()))
    }
}

impl Drop for HitbtcClient {
    fn drop(&mut self) {
        self.inner.shutdown.send_replace(true);
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Connection task
// ---------------------------------------------------------------------------

impl Inner {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscriptions(&self) -> MutexGuard<'_, Vec<Subscription>> {
        lock(&self.subscriptions)
    }

    /// Track a request, then queue its frame for the writer.
    fn submit(
        &self,
        method: &str,
        params: Params,
        custom_id: Option<u64>,
        waiter: Option<oneshot::Sender<Outcome>>,
    ) -> Result<u64> {
        // Held across tracking so a concurrent connection loss either sees the
        // request in the tracker or makes this call fail.
        let outbound = lock(&self.outbound);
        let Some(tx) = outbound.as_ref() else {
            return Err(HitbtcError::NotConnected);
        };

        let tracker = self.dispatcher.tracker();
        let request = tracker.track(method.to_owned(), params, custom_id, waiter)?;
        let json = match request.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracker.remove(request.id);
                return Err(e);
            }
        };

        if tx.send(Message::Text(json.into())).is_err() {
            tracker.remove(request.id);
            return Err(HitbtcError::NotConnected);
        }

        tracing::debug!(id = request.id, method, "Sent request");
        Ok(request.id)
    }

    async fn run(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
        ready: oneshot::Sender<Result<()>>,
    ) {
        let mut ready = Some(ready);
        let mut failures: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let attempt = tokio::select! {
                res = connect_async(self.url.as_str()) => res,
                _ = shutdown.changed() => break,
            };

            match attempt {
                Ok((ws, _)) => {
                    let opened = Instant::now();
                    let (outbound_rx, bootstrap) = self.open();
                    if let Some(tx) = ready.take() {
                        let _ = tx.send(Ok(()));
                    }

                    let ended = self.pump(ws, outbound_rx, &mut shutdown).await;
                    bootstrap.abort();

                    match ended {
                        Ended::Shutdown => break,
                        Ended::Lost => {
                            let uptime = opened.elapsed();
                            let stable = *self.state.borrow() == ConnectionState::Active
                                && self.reconnect.is_stable(uptime);

                            lock(&self.outbound).take();
                            let failed = self.dispatcher.fail_outstanding(Outcome::TransportLost);
                            self.state.send_replace(ConnectionState::Disconnected);
                            tracing::info!(url = %self.url, failed, ?uptime, "Connection lost");

                            if !self.auto_reconnect {
                                tracing::info!("Auto-reconnect disabled, staying disconnected");
                                return;
                            }

                            if stable {
                                failures = 0;
                            } else {
                                failures += 1;
                                tracing::warn!(attempt = failures, ?uptime, "Connection dropped before it was stable");
                                if !self.reconnect.allows_retry(failures) {
                                    self.give_up(failures, &mut ready);
                                    return;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(
                        url = %self.url,
                        attempt = failures,
                        error = %e,
                        "Connection attempt failed"
                    );

                    if !self.auto_reconnect || !self.reconnect.allows_retry(failures) {
                        self.give_up(failures, &mut ready);
                        return;
                    }
                }
            }

            let delay = self.reconnect.retry_delay(failures);
            tracing::info!(url = %self.url, ?delay, attempt = failures + 1, "Reconnecting");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.terminate();
    }

    fn give_up(&self, attempts: u32, ready: &mut Option<oneshot::Sender<Result<()>>>) {
        tracing::error!(attempts, "Giving up on HitBTC WebSocket");
        self.terminate();
        self.dispatcher
            .report(HitbtcError::ConnectionUnavailable { attempts });
        if let Some(tx) = ready.take() {
            let _ = tx.send(Err(HitbtcError::ConnectionUnavailable { attempts }));
        }
    }

    /// Install the writer channel for a fresh transport and start the bootstrap.
    fn open(self: &Arc<Self>) -> (mpsc::UnboundedReceiver<Message>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.outbound) = Some(tx);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_replace(ConnectionState::Bootstrapping);
        tracing::info!(url = %self.url, generation, "Connected to HitBTC WebSocket");

        let bootstrap = tokio::spawn(Arc::clone(self).bootstrap(generation));
        (rx, bootstrap)
    }

    async fn bootstrap(self: Arc<Self>, generation: u64) {
        let subscriptions = self.subscriptions().clone();
        let report = session::bootstrap(&*self, self.credentials.as_ref(), &subscriptions).await;

        // Server errors were already reported when their response arrived.
        // Once the transport is gone, failures to reach it are part of that loss.
        let superseded = self.generation.load(Ordering::Acquire) != generation
            || *self.state.borrow() != ConnectionState::Bootstrapping;
        for err in report.errors {
            if !is_reportable(&err, superseded) {
                tracing::debug!(error = %err, "Bootstrap error after connection loss");
                continue;
            }
            self.dispatcher.report(err);
        }

        let activated = self.state.send_if_modified(|state| {
            let current = self.generation.load(Ordering::Acquire) == generation;
            if current && *state == ConnectionState::Bootstrapping {
                *state = ConnectionState::Active;
                true
            } else {
                false
            }
        });
        if activated {
            tracing::info!(
                replayed = report.replayed,
                authenticated = ?report.authenticated,
                "Session active"
            );
        }
    }

    /// Move frames both ways until the transport ends or shutdown is signalled.
    async fn pump(
        &self,
        ws: WsStream,
        mut outbound: mpsc::UnboundedReceiver<Message>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Ended {
        let (mut write, mut read) = ws.split();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "Failed to send close frame");
                    }
                    return Ended::Shutdown;
                }
                Some(msg) = outbound.recv() => {
                    if let Err(e) = write.send(msg).await {
                        tracing::error!(error = %e, "Failed to write to WebSocket");
                        self.dispatcher.report(HitbtcError::WebSocket(e));
                        return Ended::Lost;
                    }
                }
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(frame = %text.as_str(), "Received frame");
                        self.dispatcher.dispatch_text(text.as_str());
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        tracing::debug!("Ping/pong");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "WebSocket closed by server");
                        return Ended::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket error");
                        self.dispatcher.report(HitbtcError::WebSocket(e));
                        return Ended::Lost;
                    }
                    None => {
                        tracing::info!("WebSocket stream ended");
                        return Ended::Lost;
                    }
                }
            }
        }
    }

    fn terminate(&self) {
        lock(&self.outbound).take();
        let cancelled = self.dispatcher.fail_outstanding(Outcome::Cancelled);
        self.state.send_replace(ConnectionState::Terminated);
        tracing::info!(cancelled, "HitBTC client stopped");
    }
}

impl SessionLink for Inner {
    fn send(&self, method: &str, params: Params) -> Result<u64> {
        self.submit(method, params, None, None)
    }

    fn request(&self, method: &str, params: Params) -> impl Future<Output = Result<Value>> + Send {
        async move {
            let (tx, rx) = oneshot::channel();
            let id = self.submit(method, params, None, Some(tx))?;

            match tokio::time::timeout(self.request_timeout, rx).await {
                Ok(Ok(outcome)) => outcome.into_result(),
                Ok(Err(_)) => Err(HitbtcError::TransportLost),
                Err(_) => {
                    self.dispatcher.tracker().remove(id);
                    tracing::warn!(id, method, timeout = ?self.request_timeout, "Request timed out");
                    Err(HitbtcError::Timeout {
                        id,
                        timeout: self.request_timeout,
                    })
                }
            }
        }
    }
}

/// Whether a bootstrap error should reach the error handler.
fn is_reportable(err: &HitbtcError, superseded: bool) -> bool {
    match err {
        HitbtcError::Server(_) => false,
        HitbtcError::NotConnected | HitbtcError::TransportLost | HitbtcError::Cancelled => {
            !superseded
        }
        _ => true,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
