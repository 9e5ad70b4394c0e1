//! In-process transport

use parking_lot::Mutex;
use shared::SocketFrame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, watch};

use super::{ConnectionState, RealtimeTransport};
use crate::error::{ClientError, ClientResult};

const CHANNEL_CAPACITY: usize = 256;

/// Transport backed by channels, driven by the owner
///
/// Inbound frames are injected with [`MemoryTransport::push`]; outbound
/// frames are recorded and can be inspected with [`MemoryTransport::sent`].
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    state_tx: Arc<watch::Sender<ConnectionState>>,
    inbound_tx: broadcast::Sender<SocketFrame>,
    sent: Arc<Mutex<Vec<SocketFrame>>>,
    closed: Arc<AtomicBool>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (inbound_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state_tx: Arc::new(state_tx),
            inbound_tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Already connected
    pub fn connected() -> Self {
        let transport = Self::new();
        transport.set_state(ConnectionState::Connected);
        transport
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    /// Deliver an inbound frame, returning how many subscribers saw it
    pub fn push(&self, frame: SocketFrame) -> usize {
        self.inbound_tx.send(frame).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inbound_tx.receiver_count()
    }

    pub fn sent(&self) -> Vec<SocketFrame> {
        self.sent.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RealtimeTransport for MemoryTransport {
    fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn subscribe(&self) -> broadcast::Receiver<SocketFrame> {
        self.inbound_tx.subscribe()
    }

    fn emit(&self, frame: SocketFrame) -> ClientResult<()> {
        if self.is_closed() {
            return Err(ClientError::Connection("Transport closed".into()));
        }
        self.sent.lock().push(frame);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.set_state(ConnectionState::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_push_reaches_subscribers() {
        let transport = MemoryTransport::connected();
        assert_eq!(transport.push(SocketFrame::raw("notification", json!({}))), 0);

        let mut rx = transport.subscribe();
        assert_eq!(transport.push(SocketFrame::raw("notification", json!({"a": 1}))), 1);
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.data["a"], 1);
    }

    #[test]
    fn test_emit_after_close_fails() {
        let transport = MemoryTransport::connected();
        transport.emit(SocketFrame::raw("x", json!(null))).unwrap();
        transport.close();
        assert!(!transport.is_connected());
        assert!(transport.emit(SocketFrame::raw("x", json!(null))).is_err());
        assert_eq!(transport.sent().len(), 1);
    }
}
