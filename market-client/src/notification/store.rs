//! Observable notification store
//!
//! Wraps [`NotificationState`] in a watch channel: `dispatch` applies an
//! action and wakes every subscriber. Request tickets order concurrent
//! fetches so a slow, superseded response can never overwrite a newer one.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use super::state::{NotificationAction, NotificationState};

/// Kinds of read request that race with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    List,
    UnreadCount,
}

impl RequestKind {
    fn index(self) -> usize {
        match self {
            RequestKind::List => 0,
            RequestKind::UnreadCount => 1,
        }
    }
}

/// Issued when a request starts; only the latest ticket per kind may land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    tx: Arc<watch::Sender<NotificationState>>,
    latest: Arc<Mutex<[u64; 2]>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(NotificationState::default());
        Self {
            tx: Arc::new(tx),
            latest: Arc::new(Mutex::new([0; 2])),
        }
    }

    pub fn dispatch(&self, action: NotificationAction) {
        tracing::trace!(action = action.name(), "Notification action");
        self.tx.send_modify(|state| state.apply(action));
    }

    /// Apply several actions as one update
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = NotificationAction>) {
        self.tx.send_modify(|state| {
            for action in actions {
                tracing::trace!(action = action.name(), "Notification action");
                state.apply(action);
            }
        });
    }

    pub fn snapshot(&self) -> NotificationState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.tx.subscribe()
    }

    pub fn begin_request(&self, kind: RequestKind) -> RequestTicket {
        let mut latest = self.latest.lock();
        latest[kind.index()] += 1;
        RequestTicket {
            kind,
            seq: latest[kind.index()],
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.lock()[ticket.kind.index()] == ticket.seq
    }

    /// Apply `actions` only if `ticket` is still the newest of its kind
    ///
    /// Returns whether the actions were applied.
    pub fn dispatch_if_current(
        &self,
        ticket: &RequestTicket,
        actions: impl IntoIterator<Item = NotificationAction>,
    ) -> bool {
        // Hold the ticket lock so no newer request can start in between
        let latest = self.latest.lock();
        if latest[ticket.kind.index()] != ticket.seq {
            tracing::debug!(
                kind = ?ticket.kind,
                seq = ticket.seq,
                latest = latest[ticket.kind.index()],
                "Discarding stale response"
            );
            return false;
        }
        self.dispatch_all(actions);
        true
    }

    /// Back to the initial state; in-flight requests become stale
    pub fn reset(&self) {
        let mut latest = self.latest.lock();
        for seq in latest.iter_mut() {
            *seq += 1;
        }
        self.dispatch(NotificationAction::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_notifies_subscribers() {
        let store = NotificationStore::new();
        let mut rx = store.subscribe();
        store.dispatch(NotificationAction::SetUnreadCount(4));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().unread_count, 4);
        assert_eq!(store.snapshot().unread_count, 4);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let store = NotificationStore::new();
        let first = store.begin_request(RequestKind::UnreadCount);
        let second = store.begin_request(RequestKind::UnreadCount);

        assert!(store.dispatch_if_current(&second, [NotificationAction::SetUnreadCount(2)]));
        assert!(!store.dispatch_if_current(&first, [NotificationAction::SetUnreadCount(9)]));
        assert_eq!(store.snapshot().unread_count, 2);
    }

    #[test]
    fn test_kinds_are_independent() {
        let store = NotificationStore::new();
        let list = store.begin_request(RequestKind::List);
        let _count = store.begin_request(RequestKind::UnreadCount);
        assert!(store.is_current(&list));
    }

    #[test]
    fn test_reset_invalidates_in_flight() {
        let store = NotificationStore::new();
        let ticket = store.begin_request(RequestKind::List);
        store.dispatch(NotificationAction::SetInitialized(true));
        store.reset();
        assert!(!store.is_current(&ticket));
        assert_eq!(store.snapshot(), NotificationState::default());
    }
}
