//! Realtime transport
//!
//! A [`RealtimeTransport`] carries [`SocketFrame`]s in both directions and
//! publishes its connection state on a watch channel, so consumers can
//! await readiness instead of polling.

mod client;
mod memory;

pub use client::SocketClient;
pub use memory::MemoryTransport;

use shared::SocketFrame;
use std::fmt;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::error::{ClientError, ClientResult};

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Bidirectional event channel to the backend
pub trait RealtimeTransport: Send + Sync {
    /// Current and future connection states
    fn state(&self) -> watch::Receiver<ConnectionState>;

    /// Inbound frames
    fn subscribe(&self) -> broadcast::Receiver<SocketFrame>;

    /// Queue an outbound frame; delivered once connected
    fn emit(&self, frame: SocketFrame) -> ClientResult<()>;

    /// Stop the transport; no reconnect afterwards
    fn close(&self);

    fn is_connected(&self) -> bool {
        let state = self.state();
        let connected = *state.borrow() == ConnectionState::Connected;
        connected
    }
}

/// Wait until `transport` reports [`ConnectionState::Connected`]
///
/// Returns immediately when already connected. A single deadline covers the
/// whole wait.
pub async fn wait_connected<T: RealtimeTransport + ?Sized>(
    transport: &T,
    timeout: Duration,
) -> ClientResult<()> {
    let mut state = transport.state();
    let ready = state.wait_for(|s| *s == ConnectionState::Connected);
    match tokio::time::timeout(timeout, ready).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) => Err(ClientError::Connection(
            "Transport dropped before connecting".into(),
        )),
        Err(_) => Err(ClientError::Timeout(format!(
            "Socket not connected after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_connected_immediate() {
        let transport = MemoryTransport::new();
        transport.set_state(ConnectionState::Connected);
        wait_connected(&transport, Duration::from_millis(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_connected_after_transition() {
        let transport = MemoryTransport::new();
        let t = transport.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            t.set_state(ConnectionState::Connecting);
            tokio::time::sleep(Duration::from_secs(1)).await;
            t.set_state(ConnectionState::Connected);
        });
        wait_connected(&transport, Duration::from_secs(10)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_connected_times_out() {
        let transport = MemoryTransport::new();
        transport.set_state(ConnectionState::Connecting);
        let err = wait_connected(&transport, Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }
}
