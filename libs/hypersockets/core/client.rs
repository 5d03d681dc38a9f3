use crate::config::ClientConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;
type WsRead = SplitStream<WsStream>;

/// How often the loops re-check an externally shared shutdown flag
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A connection that delivers no data resets the retry counter only after staying up this long
const STABLE_CONNECTION_WINDOW: Duration = Duration::from_secs(30);

/// Events published by the connection task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Connected to the server
    Connected,
    /// Disconnected from the server
    Disconnected,
    /// About to retry (1-based attempt number)
    Reconnecting(usize),
    /// Error occurred
    Error(String),
    /// Reconnection strategy exhausted after this many attempts
    GaveUp(usize),
}

/// Client metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub parse_errors: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Why a single connection ended
enum ConnectionEnd {
    /// Shutdown requested, do not reconnect
    Shutdown,
    /// Connection lost, reconnect per strategy
    Lost(HyperSocketError),
}

/// WebSocket client with persistent message routing
///
/// One background task owns the socket. Every connection it opens (the
/// first one and every reconnection) feeds the same router and handler
/// threads, so no handler is ever left attached to a dead socket.
pub struct WebSocketClient<R>
where
    R: MessageRouter,
{
    url: String,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_tx: mpsc::UnboundedSender<WsMessage>,
    event_rx: Receiver<ClientEvent>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    handler_handles: Vec<JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
    _router: PhantomData<fn() -> R>,
}

impl<R> WebSocketClient<R>
where
    R: MessageRouter,
{
    /// Start the connection task. Called by the builder.
    pub(crate) fn spawn(
        config: ClientConfig<R>,
        reconnect_strategy: Box<dyn ReconnectionStrategy>,
        handler_handles: Vec<JoinHandle<()>>,
    ) -> Self {
        let url = config.url.clone();
        let shutdown_flag = Arc::clone(&config.shutdown_flag);
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected));
        let metrics = Arc::new(AtomicMetrics::new());
        let shutdown_notify = Arc::new(Notify::new());

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();

        let task = ConnectionTask {
            config,
            reconnect_strategy,
            state: Arc::clone(&state),
            metrics: Arc::clone(&metrics),
            command_rx,
            event_tx,
            shutdown_notify: Arc::clone(&shutdown_notify),
        };
        let task_handle = tokio::spawn(task.run());

        Self {
            url,
            state,
            metrics,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
            handler_handles,
            shutdown_flag,
            shutdown_notify,
            _router: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queue a message for the active connection.
    /// Messages queued while disconnected are sent after the next connect.
    pub fn send(&self, message: WsMessage) -> Result<()> {
        self.command_tx
            .send(message)
            .map_err(|e| HyperSocketError::ChannelSend(e.to_string()))
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            parse_errors: self.metrics.parse_errors(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event, waiting at most `timeout`
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// true while the client is running
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }

    fn request_shutdown(&self) {
        self.shutdown_flag.store(false, Ordering::Release);
        self.shutdown_notify.notify_one();
    }

    /// Close the active connection, stop reconnecting and join the handler threads
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down WebSocket client for {}", self.url);
        self.request_shutdown();

        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                warn!("Connection task ended abnormally: {}", e);
            }
        }

        // The task owned the route senders, so handler channels are closed now
        let handles = std::mem::take(&mut self.handler_handles);
        debug!("Waiting for {} handler threads to complete", handles.len());
        tokio::task::spawn_blocking(move || {
            for handle in handles {
                let _ = handle.join();
            }
        })
        .await
        .map_err(|e| HyperSocketError::Handler(format!("failed to join handler threads: {}", e)))?;

        info!("All handlers shut down successfully");
        Ok(())
    }
}

impl<R> Drop for WebSocketClient<R>
where
    R: MessageRouter,
{
    fn drop(&mut self) {
        if self.task_handle.is_some() {
            debug!("WebSocket client dropped without shutdown, stopping connection task");
            self.request_shutdown();
        }
    }
}

/// State owned by the background connection task
struct ConnectionTask<R>
where
    R: MessageRouter,
{
    config: ClientConfig<R>,
    reconnect_strategy: Box<dyn ReconnectionStrategy>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_rx: mpsc::UnboundedReceiver<WsMessage>,
    event_tx: Sender<ClientEvent>,
    shutdown_notify: Arc<Notify>,
}

impl<R> ConnectionTask<R>
where
    R: MessageRouter,
{
    fn is_running(&self) -> bool {
        self.config.shutdown_flag.load(Ordering::Acquire)
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn run(mut self) {
        let mut attempt: usize = 0;

        loop {
            if !self.is_running() {
                debug!("Shutdown flag is false, exiting connection loop");
                break;
            }

            self.state.set(if attempt == 0 {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting
            });

            let end = match self.connect().await {
                Ok(Some(ws_stream)) => {
                    info!("Connected to {}", self.config.url);
                    self.state.set(ConnectionState::Connected);
                    self.emit(ClientEvent::Connected);
                    let received_before = self.metrics.messages_received();
                    let connected_at = Instant::now();

                    let end = self.handle_connection(ws_stream).await;
                    if let ConnectionEnd::Lost(ref e) = end {
                        warn!("Connection lost: {}", e);
                        self.emit(ClientEvent::Error(e.to_string()));
                    }

                    // Accept-then-close servers must keep counting towards the retry limit
                    if self.metrics.messages_received() > received_before
                        || connected_at.elapsed() >= STABLE_CONNECTION_WINDOW
                    {
                        attempt = 0;
                        self.reconnect_strategy.reset();
                    } else {
                        debug!("Connection closed before delivering data, keeping attempt {}", attempt);
                    }
                    self.state.set(ConnectionState::Disconnected);
                    self.emit(ClientEvent::Disconnected);
                    end
                }
                Ok(None) => ConnectionEnd::Shutdown,
                Err(e) => {
                    error!("Failed to connect to {}: {}", self.config.url, e);
                    self.state.set(ConnectionState::Disconnected);
                    self.emit(ClientEvent::Error(e.to_string()));
                    ConnectionEnd::Lost(e)
                }
            };

            if matches!(end, ConnectionEnd::Shutdown) || !self.is_running() {
                break;
            }

            match self.reconnect_strategy.next_delay(attempt) {
                Some(delay) => {
                    attempt += 1;
                    info!("Reconnecting in {:?} (attempt {})", delay, attempt);
                    self.emit(ClientEvent::Reconnecting(attempt));
                    self.metrics.increment_reconnects();

                    if !self.sleep_unless_shutdown(delay).await {
                        debug!("Shutdown requested during reconnection delay");
                        break;
                    }
                }
                None => {
                    warn!("Reconnection strategy exhausted after {} attempts, stopping", attempt);
                    self.emit(ClientEvent::GaveUp(attempt));
                    break;
                }
            }
        }

        self.state.set(if self.is_running() {
            ConnectionState::Disconnected
        } else {
            ConnectionState::ShuttingDown
        });
        info!("Client task exiting");
    }

    /// Open a socket. `Ok(None)` means shutdown was requested while connecting.
    async fn connect(&self) -> Result<Option<WsStream>> {
        let connect = tokio::time::timeout(self.config.connect_timeout, connect_async(self.config.url.as_str()));

        tokio::select! {
            result = connect => match result {
                Ok(Ok((ws_stream, _response))) => Ok(Some(ws_stream)),
                Ok(Err(e)) => Err(HyperSocketError::WebSocket(e.to_string())),
                Err(_) => Err(HyperSocketError::Timeout(format!(
                    "handshake with {} exceeded {:?}",
                    self.config.url, self.config.connect_timeout
                ))),
            },
            _ = self.wait_for_shutdown() => Ok(None),
        }
    }

    /// Resolves once shutdown is requested via notify or the shared flag
    async fn wait_for_shutdown(&self) {
        let mut ticker = tokio::time::interval(SHUTDOWN_POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = self.shutdown_notify.notified() => return,
                _ = ticker.tick() => {
                    if !self.is_running() {
                        return;
                    }
                }
            }
        }
    }

    /// Returns false if shutdown was requested before the delay elapsed
    async fn sleep_unless_shutdown(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => self.is_running(),
            _ = self.wait_for_shutdown() => false,
        }
    }

    async fn handle_connection(&mut self, ws_stream: WsStream) -> ConnectionEnd {
        let (mut write, mut read) = ws_stream.split();

        for sub in &self.config.subscriptions {
            if let Err(e) = write.send(to_tungstenite(sub)).await {
                return ConnectionEnd::Lost(HyperSocketError::WebSocket(format!(
                    "Failed to send subscription: {}",
                    e
                )));
            }
            self.metrics.increment_sent();
            debug!("Sent subscription message");
        }

        let end = self.message_loop(&mut write, &mut read).await;
        if matches!(end, ConnectionEnd::Shutdown) {
            debug!("Closing WebSocket connection");
            let _ = write.close().await;
        }
        end
    }

    async fn message_loop(&mut self, write: &mut WsWrite, read: &mut WsRead) -> ConnectionEnd {
        let shutdown_notify = Arc::clone(&self.shutdown_notify);
        let mut ticker = tokio::time::interval(SHUTDOWN_POLL_INTERVAL);

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("{} {}", f.code, f.reason))
                            .unwrap_or_else(|| "no close frame".to_string());
                        return ConnectionEnd::Lost(HyperSocketError::ConnectionClosed(reason));
                    }
                    Some(Ok(msg)) => {
                        if let Some(ws_msg) = from_tungstenite(msg) {
                            self.metrics.increment_received();
                            self.dispatch(ws_msg).await;
                        }
                    }
                    Some(Err(e)) => {
                        return ConnectionEnd::Lost(HyperSocketError::WebSocket(e.to_string()));
                    }
                    None => {
                        return ConnectionEnd::Lost(HyperSocketError::ConnectionClosed("Stream ended".into()));
                    }
                },

                cmd = self.command_rx.recv() => match cmd {
                    Some(message) => {
                        if let Err(e) = write.send(to_tungstenite(&message)).await {
                            return ConnectionEnd::Lost(HyperSocketError::WebSocket(e.to_string()));
                        }
                        self.metrics.increment_sent();
                    }
                    None => {
                        debug!("Command channel closed");
                        return ConnectionEnd::Shutdown;
                    }
                },

                _ = shutdown_notify.notified() => {
                    info!("Received shutdown request");
                    return ConnectionEnd::Shutdown;
                }

                _ = ticker.tick() => {
                    if !self.is_running() {
                        debug!("Shutdown flag detected in message loop");
                        return ConnectionEnd::Shutdown;
                    }
                }
            }
        }
    }

    /// Parse in arrival order and hand the result to its route's handler thread
    async fn dispatch(&self, message: WsMessage) {
        let router = &self.config.router;
        match router.parse(message).await {
            Ok(parsed) => {
                let route_key = router.route_key(&parsed);
                match self.config.route_senders.get(&route_key) {
                    Some(sender) => {
                        // Fails only while handlers are shutting down
                        let _ = sender.send(parsed);
                    }
                    None => warn!("No handler configured for route key: {:?}", route_key),
                }
            }
            Err(e) => {
                self.metrics.increment_parse_errors();
                debug!("Dropping unparseable message: {}", e);
            }
        }
    }
}

fn to_tungstenite(msg: &WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text.clone()),
        WsMessage::Binary(data) => Message::Binary(data.clone()),
    }
}

fn from_tungstenite(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_frames_are_not_routed() {
        assert_eq!(from_tungstenite(Message::Ping(vec![1])), None);
        assert_eq!(from_tungstenite(Message::Pong(vec![])), None);
        assert_eq!(from_tungstenite(Message::Close(None)), None);
    }

    #[test]
    fn test_data_frames_convert_both_ways() {
        let text = WsMessage::Text("{\"base\":\"bitcoin\"}".into());
        assert_eq!(from_tungstenite(to_tungstenite(&text)), Some(text));

        let binary = WsMessage::Binary(vec![0, 1, 2]);
        assert_eq!(from_tungstenite(to_tungstenite(&binary)), Some(binary));
    }
}
