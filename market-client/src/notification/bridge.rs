//! Socket → store bridge
//!
//! Subscribes to `notification` frames once the transport is connected and
//! turns them into store actions. One attachment per (token, user) pair.

use parking_lot::Mutex;
use shared::message::{EVENT_MARK_READ, EVENT_NOTIFICATION, MarkReadRequest};
use shared::{InboundNotification, SocketFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::native::{NativeNotifier, PermissionState};
use super::state::NotificationAction;
use super::store::NotificationStore;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionKey;
use crate::socket::{RealtimeTransport, wait_connected};

/// Result of [`SocketBridge::attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// Same session already attached (or attaching)
    AlreadyAttached,
}

struct Attachment {
    generation: u64,
    key: SessionKey,
    transport: Arc<dyn RealtimeTransport>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Attachment {
    fn stop(self) {
        self.cancel.cancel();
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

pub struct SocketBridge {
    store: NotificationStore,
    notifier: Arc<dyn NativeNotifier>,
    ready_timeout: Duration,
    active: Mutex<Option<Attachment>>,
    generation: AtomicU64,
}

impl SocketBridge {
    pub fn new(
        store: NotificationStore,
        notifier: Arc<dyn NativeNotifier>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            ready_timeout,
            active: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Start forwarding `transport`'s notification frames into the store
    ///
    /// Waits up to the ready timeout for the transport to connect. On
    /// timeout nothing is registered and `ClientError::Timeout` is returned;
    /// a later call may try again.
    pub async fn attach(
        &self,
        transport: Arc<dyn RealtimeTransport>,
        key: SessionKey,
    ) -> ClientResult<AttachOutcome> {
        let cancel = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        {
            let mut active = self.active.lock();
            if let Some(current) = active.as_ref()
                && current.key == key
            {
                return Ok(AttachOutcome::AlreadyAttached);
            }
            if let Some(previous) = active.take() {
                tracing::info!(user_id = %previous.key.user_id, "Detaching previous socket session");
                previous.stop();
            }
            *active = Some(Attachment {
                generation,
                key: key.clone(),
                transport: transport.clone(),
                cancel: cancel.clone(),
                task: None,
            });
        }

        if self.notifier.permission() == PermissionState::Default {
            let permission = self.notifier.request_permission().await;
            tracing::debug!(?permission, "Native notification permission");
        }

        let ready = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ClientError::Connection("Detached while waiting for socket".into()));
            }
            ready = wait_connected(transport.as_ref(), self.ready_timeout) => ready,
        };
        if let Err(e) = ready {
            tracing::warn!(
                user_id = %key.user_id,
                "Socket not ready, notification listener not registered: {}",
                e
            );
            self.release(generation);
            return Err(e);
        }

        let rx = transport.subscribe();
        let task = tokio::spawn(run_handler(
            rx,
            self.store.clone(),
            self.notifier.clone(),
            cancel.clone(),
        ));

        let mut active = self.active.lock();
        match active.as_mut() {
            Some(current) if current.generation == generation => {
                current.task = Some(task);
                tracing::info!(user_id = %key.user_id, "Notification listener registered");
                Ok(AttachOutcome::Attached)
            }
            _ => {
                // Superseded while waiting
                task.abort();
                Err(ClientError::Connection("Detached while waiting for socket".into()))
            }
        }
    }

    /// Stop listening; the transport itself stays open
    pub fn detach(&self) {
        if let Some(attachment) = self.active.lock().take() {
            tracing::info!(user_id = %attachment.key.user_id, "Notification listener removed");
            attachment.stop();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|a| a.task.is_some())
    }

    pub fn attached_key(&self) -> Option<SessionKey> {
        self.active.lock().as_ref().map(|a| a.key.clone())
    }

    /// Ask the server over the socket to mark `id` read
    ///
    /// The store changes once the server answers with a read-success push.
    pub fn request_mark_read(&self, id: &str) -> ClientResult<()> {
        let transport = self
            .active
            .lock()
            .as_ref()
            .filter(|a| a.task.is_some())
            .map(|a| a.transport.clone())
            .ok_or_else(|| ClientError::Connection("No socket attached".into()))?;
        let frame = SocketFrame::new(
            EVENT_MARK_READ,
            &MarkReadRequest {
                notification_id: id.to_string(),
            },
        )?;
        transport.emit(frame)
    }

    fn release(&self, generation: u64) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|a| a.generation == generation) {
            active.take();
        }
    }
}

impl Drop for SocketBridge {
    fn drop(&mut self) {
        if let Some(attachment) = self.active.get_mut().take() {
            attachment.stop();
        }
    }
}

async fn run_handler(
    mut rx: broadcast::Receiver<SocketFrame>,
    store: NotificationStore,
    notifier: Arc<dyn NativeNotifier>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = rx.recv() => match frame {
                Ok(frame) if frame.is(EVENT_NOTIFICATION) => {
                    handle_notification(&frame, &store, notifier.as_ref());
                }
                Ok(frame) => tracing::trace!(event = %frame.event, "Ignoring socket event"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Notification listener lagged {n} frames");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Socket frame channel closed");
                    break;
                }
            }
        }
    }
}

fn handle_notification(frame: &SocketFrame, store: &NotificationStore, notifier: &dyn NativeNotifier) {
    match InboundNotification::from_value(&frame.data) {
        Some(InboundNotification::Delivered(notification)) => {
            tracing::debug!(notification_id = %notification.id, "Notification pushed");
            if notifier.permission() == PermissionState::Granted {
                notifier.show(&notification.title, &notification.message);
            }
            store.dispatch(NotificationAction::AddOne(*notification));
        }
        Some(InboundNotification::UnreadCountUpdate { unread_count }) => {
            store.dispatch(NotificationAction::SetUnreadCount(unread_count));
        }
        Some(InboundNotification::ReadSuccess { notification_id }) => {
            tracing::debug!(notification_id = %notification_id, "Read confirmed by server");
            store.dispatch(NotificationAction::MarkOneRead(notification_id));
        }
        Some(InboundNotification::Error { message }) => {
            tracing::warn!("Notification socket error: {}", message);
        }
        None => tracing::debug!("Unrecognized notification payload"),
    }
}
