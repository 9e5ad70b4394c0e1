//! WebSocket transport on tokio-tungstenite
//!
//! One [`SocketClient`] per signed-in session. A background worker owns the
//! connection: it authenticates with the bearer token at connect time,
//! forwards inbound JSON frames to subscribers, drains the outbound queue,
//! answers pings and reconnects with exponential backoff until closed.

use futures::{SinkExt, StreamExt};
use shared::SocketFrame;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ConnectionState, RealtimeTransport};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Inbound broadcast capacity
const CHANNEL_CAPACITY: usize = 256;
/// Initial reconnect delay
const INITIAL_RECONNECT_DELAY_MS: u64 = 500;
/// Max reconnect delay
const MAX_RECONNECT_DELAY_SECS: u64 = 30;
/// Keepalive ping interval
const WS_PING_INTERVAL_SECS: u64 = 25;

/// Authenticated WebSocket client
#[derive(Debug)]
pub struct SocketClient {
    id: Uuid,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    inbound_tx: broadcast::Sender<SocketFrame>,
    outbound_tx: mpsc::UnboundedSender<SocketFrame>,
    shutdown: CancellationToken,
}

impl SocketClient {
    /// Spawn the connection worker for `session`
    ///
    /// Returns immediately; follow [`RealtimeTransport::state`] to know when
    /// the socket is usable. Must be called inside a tokio runtime.
    pub fn connect(config: &ClientConfig, session: &Session) -> ClientResult<Self> {
        let url = config.resolved_socket_url();
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(ClientError::Config(format!("Not a WebSocket URL: {url}")));
        }

        let id = Uuid::new_v4();
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let state_tx = Arc::new(state_tx);
        let (inbound_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let worker = SocketWorker {
            id,
            url,
            token: session.token.clone(),
            state_tx: state_tx.clone(),
            inbound_tx: inbound_tx.clone(),
            outbound_rx,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run());

        tracing::info!(client_id = %id, user_id = %session.user.id, "Socket client started");
        Ok(Self {
            id,
            state_tx,
            inbound_tx,
            outbound_tx,
            shutdown,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl RealtimeTransport for SocketClient {
    fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn subscribe(&self) -> broadcast::Receiver<SocketFrame> {
        self.inbound_tx.subscribe()
    }

    fn emit(&self, frame: SocketFrame) -> ClientResult<()> {
        self.outbound_tx
            .send(frame)
            .map_err(|_| ClientError::Connection("Socket client closed".into()))
    }

    fn close(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(client_id = %self.id, "Closing socket client");
            self.shutdown.cancel();
        }
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Why a session ended
enum SessionEnd {
    Shutdown,
    Disconnected,
}

struct SocketWorker {
    id: Uuid,
    url: String,
    token: String,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    inbound_tx: broadcast::Sender<SocketFrame>,
    outbound_rx: mpsc::UnboundedReceiver<SocketFrame>,
    shutdown: CancellationToken,
}

impl SocketWorker {
    async fn run(mut self) {
        let initial_delay = Duration::from_millis(INITIAL_RECONNECT_DELAY_MS);
        let max_delay = Duration::from_secs(MAX_RECONNECT_DELAY_SECS);
        let mut reconnect_delay = initial_delay;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            self.state_tx.send_replace(ConnectionState::Connecting);

            match self.connect().await {
                Ok(ws) => {
                    reconnect_delay = initial_delay;
                    self.state_tx.send_replace(ConnectionState::Connected);
                    tracing::info!(client_id = %self.id, "Socket connected");

                    let end = self.run_session(ws).await;
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    if matches!(end, SessionEnd::Shutdown) {
                        break;
                    }
                }
                Err(ConnectError::Rejected(status)) => {
                    tracing::error!(
                        client_id = %self.id,
                        %status,
                        "Socket handshake rejected, backing off"
                    );
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    reconnect_delay = max_delay;
                }
                Err(ConnectError::Other(e)) => {
                    tracing::warn!(
                        client_id = %self.id,
                        delay_ms = reconnect_delay.as_millis() as u64,
                        "Socket connection failed: {e}"
                    );
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {},
            }
            reconnect_delay = (reconnect_delay * 2).min(max_delay);
        }

        self.state_tx.send_replace(ConnectionState::Disconnected);
        tracing::info!(client_id = %self.id, "Socket worker stopped");
    }

    async fn connect(&self) -> Result<WsStream, ConnectError> {
        let request = build_request(&self.url, &self.token)
            .map_err(|e| ConnectError::Other(e.to_string()))?;

        match tokio_tungstenite::connect_async(request).await {
            Ok((ws, _response)) => Ok(ws),
            Err(tungstenite::Error::Http(resp))
                if resp.status() == 401 || resp.status() == 403 =>
            {
                Err(ConnectError::Rejected(resp.status().as_u16()))
            }
            Err(e) => Err(ConnectError::Other(e.to_string())),
        }
    }

    async fn run_session(&mut self, ws: WsStream) -> SessionEnd {
        let (mut ws_sink, mut ws_stream) = ws.split();

        let mut ping_interval = tokio::time::interval(Duration::from_secs(WS_PING_INTERVAL_SECS));
        ping_interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = ws_sink.close().await;
                    return SessionEnd::Shutdown;
                }

                _ = ping_interval.tick() => {
                    if ws_sink.send(Message::Ping(vec![].into())).await.is_err() {
                        tracing::warn!(client_id = %self.id, "Socket ping failed, disconnecting");
                        return SessionEnd::Disconnected;
                    }
                }

                outbound = self.outbound_rx.recv() => {
                    let Some(frame) = outbound else {
                        // Every SocketClient handle is gone
                        let _ = ws_sink.close().await;
                        return SessionEnd::Shutdown;
                    };
                    let text = match frame.to_text() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(event = %frame.event, "Dropping unserializable frame: {e}");
                            continue;
                        }
                    };
                    if let Err(e) = ws_sink.send(Message::Text(text.into())).await {
                        tracing::warn!(client_id = %self.id, "Socket send failed: {e}");
                        return SessionEnd::Disconnected;
                    }
                }

                msg = ws_stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_text(&text),
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!(client_id = %self.id, "Socket closed by server");
                            return SessionEnd::Disconnected;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(client_id = %self.id, "Socket error: {e}");
                            return SessionEnd::Disconnected;
                        }
                        None => {
                            tracing::info!(client_id = %self.id, "Socket stream ended");
                            return SessionEnd::Disconnected;
                        }
                        _ => {} // Binary, Pong
                    }
                }
            }
        }
    }

    fn handle_text(&self, text: &str) {
        match SocketFrame::from_text(text) {
            Ok(frame) => {
                tracing::trace!(event = %frame.event, "Socket frame received");
                // No subscribers is fine
                let _ = self.inbound_tx.send(frame);
            }
            Err(e) => tracing::warn!("Invalid socket frame: {e}"),
        }
    }
}

enum ConnectError {
    Rejected(u16),
    Other(String),
}

/// Build the upgrade request carrying the bearer token
///
/// The token travels both as `Authorization` header and `token` query
/// parameter; backends read either.
fn build_request(
    url: &str,
    token: &str,
) -> Result<tungstenite::http::Request<()>, tungstenite::http::Error> {
    let separator = if url.contains('?') { '&' } else { '?' };
    let uri = format!("{url}{separator}token={}", urlencoding::encode(token));

    let host = url
        .split("://")
        .nth(1)
        .and_then(|s| s.split('/').next())
        .unwrap_or("localhost");

    tungstenite::http::Request::builder()
        .uri(&uri)
        .header("Host", host)
        .header("Authorization", format!("Bearer {token}"))
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header(
            "Sec-WebSocket-Key",
            tungstenite::handshake::client::generate_key(),
        )
        .body(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_carries_token() {
        let req = build_request("ws://localhost:5000/socket", "abc").unwrap();
        assert_eq!(req.uri().to_string(), "ws://localhost:5000/socket?token=abc");
        assert_eq!(req.headers()["Host"], "localhost:5000");
        assert_eq!(req.headers()["Authorization"], "Bearer abc");
        assert!(req.headers().contains_key("Sec-WebSocket-Key"));
    }

    #[test]
    fn test_build_request_escapes_token() {
        let req = build_request("ws://localhost:5000/socket", "a+b/c=&d").unwrap();
        assert_eq!(
            req.uri().to_string(),
            "ws://localhost:5000/socket?token=a%2Bb%2Fc%3D%26d"
        );
        assert_eq!(req.headers()["Authorization"], "Bearer a+b/c=&d");
    }

    #[test]
    fn test_build_request_existing_query() {
        let req = build_request("wss://api.example.com/socket?v=2", "t").unwrap();
        assert_eq!(req.uri().query(), Some("v=2&token=t"));
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        let config = ClientConfig::new("http://h/api").with_socket_url("http://h/socket");
        let user = shared::models::User::default();
        let err = SocketClient::connect(&config, &Session::new("tok", user)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_never_connects() {
        let config = ClientConfig::new("http://127.0.0.1:9/api");
        let user = shared::models::User {
            id: "u1".into(),
            email: "a@b.c".into(),
            name: "A".into(),
            role: Default::default(),
        };
        let client = SocketClient::connect(&config, &Session::new("tok", user)).unwrap();
        client.emit(SocketFrame::raw("ping", serde_json::Value::Null)).unwrap();

        let err = super::super::wait_connected(&client, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));

        client.close();
    }
}
