//! Common test utilities for coincap integration tests

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A request seen by [`MockHttpServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw header block, lowercased
    pub headers: String,
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server answering every request through `respond`
pub struct MockHttpServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<Notify>,
}

impl MockHttpServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(Notify::new());
        let respond: Arc<Responder> = Arc::new(respond);

        let requests_clone = requests.clone();
        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { break };
                        let requests = requests_clone.clone();
                        let respond = respond.clone();
                        tokio::spawn(async move {
                            Self::serve(stream, requests, respond).await;
                        });
                    }
                    _ = shutdown_clone.notified() => break,
                }
            }
        });

        Self {
            addr,
            requests,
            shutdown,
        }
    }

    async fn serve(
        mut stream: TcpStream,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
        respond: Arc<Responder>,
    ) {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => raw.extend_from_slice(&buf[..n]),
            }
        }

        let text = String::from_utf8_lossy(&raw).to_string();
        let mut lines = text.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split_whitespace();
        let request = RecordedRequest {
            method: request_line.next().unwrap_or_default().to_string(),
            path: request_line.next().unwrap_or_default().to_string(),
            headers: lines.collect::<Vec<_>>().join("\n").to_lowercase(),
        };

        let (status, body) = respond(&request);
        requests.lock().push(request);

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason(status),
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.shutdown.notify_waiters();
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// JSON body of `GET /v2/assets` with `count` generated assets
pub fn assets_body(count: usize, first_rank: usize) -> String {
    let assets: Vec<String> = (0..count)
        .map(|i| {
            let rank = first_rank + i;
            format!(
                r#"{{"id":"coin-{rank}","rank":"{rank}","symbol":"C{rank}","name":"Coin {rank}","priceUsd":"{rank}.125"}}"#
            )
        })
        .collect();
    format!(r#"{{"data":[{}],"timestamp":1712345678901}}"#, assets.join(","))
}

/// What the WebSocket server does after sending its frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterScript {
    Close,
    Hold,
}

/// Mock trade feed replaying the same frames to every connection
pub struct MockTradeFeed {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl MockTradeFeed {
    pub async fn start(frames: Vec<String>, after: AfterScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));

        let shutdown_clone = shutdown.clone();
        let connections_clone = connections.clone();
        let active_clone = active.clone();
        let frames = Arc::new(frames);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { break };
                        connections_clone.fetch_add(1, Ordering::SeqCst);
                        let shutdown = shutdown_clone.clone();
                        let active = active_clone.clone();
                        let frames = frames.clone();
                        tokio::spawn(async move {
                            active.fetch_add(1, Ordering::SeqCst);
                            Self::feed(stream, &frames, after, shutdown).await;
                            active.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                    _ = shutdown_clone.notified() => break,
                }
            }
        });

        Self {
            addr,
            shutdown,
            connections,
            active,
        }
    }

    async fn feed(stream: TcpStream, frames: &[String], after: AfterScript, shutdown: Arc<Notify>) {
        let Ok(ws_stream) = accept_async(stream).await else { return };
        let (mut write, mut read) = ws_stream.split();

        for frame in frames {
            if write.send(Message::Text(frame.clone())).await.is_err() {
                return;
            }
        }

        if after == AfterScript::Close {
            let _ = write.close().await;
            return;
        }

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(msg)) if msg.is_close() => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
                _ = shutdown.notified() => break,
            }
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/trades/binance", self.addr)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for MockTradeFeed {
    fn drop(&mut self) {
        self.shutdown.notify_waiters();
    }
}

/// One trade frame as the CoinCap feed sends it
pub fn trade_frame(base: &str, price: f64) -> String {
    format!(
        r#"{{"exchange":"binance","base":"{}","quote":"tether","direction":"buy","price":{},"volume":"0.5","timestamp":1712345678901,"priceUsd":"{}"}}"#,
        base, price, price
    )
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
