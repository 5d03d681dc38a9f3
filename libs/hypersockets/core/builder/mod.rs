pub mod states;

use crate::client::WebSocketClient;
use crate::config::{ClientConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::traits::*;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use states::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How often an idle handler thread re-checks the shutdown flag
const HANDLER_POLL_INTERVAL: Duration = Duration::from_millis(50);

type RouteSenders<R> = HashMap<<R as MessageRouter>::RouteKey, Sender<<R as MessageRouter>::Message>>;

/// Type-state builder for WebSocketClient
///
/// URL and router must be set before `build()` is available.
pub struct WebSocketClientBuilder<U, Ro, R>
where
    U: UrlState,
    Ro: RouterState,
{
    _state: TypeState<U, Ro>,
    url: Option<String>,
    router: Option<R>,
    // RoutingBuilder<R> is only nameable once R is a router, so it is stored erased
    routing: Option<Box<dyn std::any::Any + Send>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    subscriptions: Vec<WsMessage>,
    connect_timeout: Duration,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl WebSocketClientBuilder<NoUrl, NoRouter, ()> {
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            router: None,
            routing: None,
            reconnect_strategy: None,
            subscriptions: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            shutdown_flag: None,
        }
    }
}

impl Default for WebSocketClientBuilder<NoUrl, NoRouter, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ro, R> WebSocketClientBuilder<NoUrl, Ro, R>
where
    Ro: RouterState,
{
    pub fn url(self, url: impl Into<String>) -> WebSocketClientBuilder<HasUrl, Ro, R> {
        WebSocketClientBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            router: self.router,
            routing: self.routing,
            reconnect_strategy: self.reconnect_strategy,
            subscriptions: self.subscriptions,
            connect_timeout: self.connect_timeout,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

/// Collects handlers per route key
pub struct RoutingBuilder<R>
where
    R: MessageRouter,
{
    handlers: Vec<(R::RouteKey, Box<dyn MessageHandler<R::Message>>)>,
}

impl<R> RoutingBuilder<R>
where
    R: MessageRouter,
{
    fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Add a handler for a route key. A later handler for the same key replaces the earlier one.
    pub fn handler<H>(mut self, route_key: R::RouteKey, handler: H) -> Self
    where
        H: MessageHandler<R::Message>,
    {
        self.handlers.retain(|(key, _)| key != &route_key);
        self.handlers.push((route_key, Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Spawn one OS thread per handler and return the senders feeding them
    fn spawn(self, shutdown_flag: &Arc<AtomicBool>) -> Result<(RouteSenders<R>, Vec<JoinHandle<()>>)> {
        let mut senders = HashMap::new();
        let mut handles = Vec::new();

        for (route_key, handler) in self.handlers {
            let (sender, receiver) = crossbeam_channel::unbounded();
            senders.insert(route_key.clone(), sender);

            let shutdown_flag = Arc::clone(shutdown_flag);
            let handle = std::thread::Builder::new()
                .name(format!("hs-handler-{:?}", route_key))
                .spawn(move || run_handler(route_key, handler, receiver, shutdown_flag))
                .map_err(|e| HyperSocketError::Configuration(format!("failed to spawn handler thread: {}", e)))?;

            handles.push(handle);
        }

        Ok((senders, handles))
    }
}

fn run_handler<K, M>(
    route_key: K,
    mut handler: Box<dyn MessageHandler<M>>,
    receiver: Receiver<M>,
    shutdown_flag: Arc<AtomicBool>,
) where
    K: std::fmt::Debug,
    M: Send + std::fmt::Debug + 'static,
{
    loop {
        match receiver.recv_timeout(HANDLER_POLL_INTERVAL) {
            Ok(message) => {
                if let Err(e) = handler.handle(message) {
                    tracing::error!("Handler error for route {:?}: {}", route_key, e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !shutdown_flag.load(Ordering::Acquire) {
                    tracing::debug!("Shutdown flag detected, handler thread for route {:?} exiting", route_key);
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("Handler channel closed for route {:?}, thread exiting", route_key);
                break;
            }
        }
    }
}

impl<U> WebSocketClientBuilder<U, NoRouter, ()>
where
    U: UrlState,
{
    pub fn router<NewR, F>(self, router: NewR, configure_routing: F) -> WebSocketClientBuilder<U, HasRouter, NewR>
    where
        NewR: MessageRouter,
        F: FnOnce(RoutingBuilder<NewR>) -> RoutingBuilder<NewR>,
    {
        let routing = configure_routing(RoutingBuilder::<NewR>::new());

        WebSocketClientBuilder {
            _state: TypeState::new(),
            url: self.url,
            router: Some(router),
            routing: Some(Box::new(routing)),
            reconnect_strategy: self.reconnect_strategy,
            subscriptions: self.subscriptions,
            connect_timeout: self.connect_timeout,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

// Optional configuration methods
impl<U, R> WebSocketClientBuilder<U, HasRouter, R>
where
    U: UrlState,
    R: MessageRouter,
{
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Message sent after every successful (re)connection
    pub fn subscription(mut self, message: WsMessage) -> Self {
        self.subscriptions.push(message);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Share a shutdown flag with other components
    ///
    /// true = keep running. Storing `false` stops the client within ~100ms
    /// and prevents further reconnection attempts.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

impl<R> WebSocketClientBuilder<HasUrl, HasRouter, R>
where
    R: MessageRouter,
{
    /// Spawn the handler threads and the connection task.
    ///
    /// Must be called inside a tokio runtime. Returns immediately; the first
    /// connection attempt happens in the background.
    pub async fn build(self) -> Result<WebSocketClient<R>> {
        let url = self
            .url
            .ok_or_else(|| HyperSocketError::Configuration("URL must be set".into()))?;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(HyperSocketError::Configuration(format!(
                "URL must start with ws:// or wss://, got {}",
                url
            )));
        }

        let router = self
            .router
            .ok_or_else(|| HyperSocketError::Configuration("Router must be set".into()))?;

        let routing = self
            .routing
            .ok_or_else(|| HyperSocketError::Configuration("Routing must be set".into()))?
            .downcast::<RoutingBuilder<R>>()
            .map_err(|_| HyperSocketError::Configuration("Routing builder type mismatch".into()))?;

        let shutdown_flag = self
            .shutdown_flag
            .unwrap_or_else(|| Arc::new(AtomicBool::new(true)));

        let reconnect_strategy = self.reconnect_strategy.unwrap_or_else(|| {
            Box::new(
                ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60), Some(10))
                    .with_jitter(0.2),
            )
        });

        let (route_senders, handler_handles) = routing.spawn(&shutdown_flag)?;

        let config = ClientConfig {
            url,
            router: Arc::new(router),
            route_senders,
            subscriptions: self.subscriptions,
            connect_timeout: self.connect_timeout,
            shutdown_flag,
        };

        Ok(WebSocketClient::spawn(config, reconnect_strategy, handler_handles))
    }
}
