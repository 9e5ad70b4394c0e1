//! Notification fetch layer
//!
//! Performs the authenticated REST calls and turns their results into store
//! actions. Read paths never return errors: failures are logged and land in
//! `error` state. Writes report success as `bool` and leave state untouched
//! on failure.

use parking_lot::Mutex;
use shared::models::NotificationQuery;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::state::{NotificationAction, NotificationState};
use super::store::{NotificationStore, RequestKind};
use crate::api::MarketApi;
use crate::http::HttpClient;
use crate::session::{AuthSession, Session, SessionKey};

pub struct NotificationCenter<H: HttpClient> {
    api: MarketApi<H>,
    store: NotificationStore,
    /// Filters of the last list fetch, reused by `load_more`/`refresh`
    query: Arc<Mutex<NotificationQuery>>,
    active: Arc<Mutex<Option<SessionKey>>>,
}

impl<H: HttpClient> Clone for NotificationCenter<H> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            query: self.query.clone(),
            active: self.active.clone(),
        }
    }
}

impl<H: HttpClient> NotificationCenter<H> {
    pub fn new(api: MarketApi<H>, store: NotificationStore, page_size: u32) -> Self {
        Self {
            api,
            store,
            query: Arc::new(Mutex::new(NotificationQuery::new(1, page_size))),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn state(&self) -> NotificationState {
        self.store.snapshot()
    }

    /// Fetch one page; page 1 replaces the list, later pages append
    pub async fn fetch(&self, query: NotificationQuery) {
        *self.query.lock() = query.clone();
        let ticket = self.store.begin_request(RequestKind::List);
        self.store.dispatch(NotificationAction::SetLoading(true));

        match self.api.list_notifications(&query).await {
            Ok(page) => {
                tracing::debug!(
                    page = query.page,
                    count = page.notifications.len(),
                    unread = page.unread_count,
                    "Fetched notifications"
                );
                let list = if query.page <= 1 {
                    NotificationAction::ReplaceList(page.notifications)
                } else {
                    NotificationAction::AppendList(page.notifications)
                };
                self.store.dispatch_if_current(
                    &ticket,
                    [
                        list,
                        NotificationAction::SetUnreadCount(page.unread_count),
                        NotificationAction::SetHasMore(page.pagination.has_more),
                        NotificationAction::SetPage(query.page),
                        NotificationAction::SetLoading(false),
                    ],
                );
            }
            Err(e) => {
                tracing::error!(page = query.page, "Failed to fetch notifications: {}", e);
                self.store
                    .dispatch_if_current(&ticket, [NotificationAction::SetError(Some(e.to_string()))]);
            }
        }
    }

    pub async fn fetch_unread_count(&self) {
        let ticket = self.store.begin_request(RequestKind::UnreadCount);
        match self.api.unread_count().await {
            Ok(count) => {
                self.store
                    .dispatch_if_current(&ticket, [NotificationAction::SetUnreadCount(count)]);
            }
            Err(e) => tracing::error!("Failed to fetch unread count: {}", e),
        }
    }

    /// Mark one notification read once the server confirms it
    pub async fn mark_as_read(&self, id: &str) -> bool {
        match self.api.mark_notification_read(id).await {
            Ok(_) => {
                self.store
                    .dispatch(NotificationAction::MarkOneRead(id.to_string()));
                true
            }
            Err(e) => {
                tracing::error!(notification_id = %id, "Failed to mark notification as read: {}", e);
                false
            }
        }
    }

    /// Mark `ids` read; an empty slice marks every unread notification
    pub async fn mark_all_as_read(&self, ids: &[String]) -> bool {
        match self.api.mark_notifications_read(ids).await {
            Ok(modified) => {
                tracing::debug!(requested = ids.len(), modified, "Marked notifications as read");
                if ids.is_empty() {
                    self.store.dispatch(NotificationAction::MarkAllRead);
                } else {
                    self.store.dispatch_all(
                        ids.iter()
                            .map(|id| NotificationAction::MarkOneRead(id.clone())),
                    );
                }
                true
            }
            Err(e) => {
                tracing::error!(count = ids.len(), "Failed to mark notifications as read: {}", e);
                false
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.api.delete_notification(id).await {
            Ok(()) => {
                self.store
                    .dispatch(NotificationAction::RemoveOne(id.to_string()));
                true
            }
            Err(e) => {
                tracing::error!(notification_id = %id, "Failed to delete notification: {}", e);
                false
            }
        }
    }

    /// Fetch the next page when there is one and nothing is loading
    ///
    /// Returns whether a fetch was issued.
    pub async fn load_more(&self) -> bool {
        let state = self.store.snapshot();
        if !state.has_more || state.loading {
            return false;
        }
        let mut next = self.query.lock().clone();
        next.page = state.page.max(1) + 1;
        self.fetch(next).await;
        true
    }

    /// Page 1 with the current filters, plus the unread count
    pub async fn refresh(&self) {
        let mut first = self.query.lock().clone();
        first.page = 1;
        tokio::join!(self.fetch(first), self.fetch_unread_count());
    }

    /// Follow the signed-in session
    ///
    /// A new (token, user) pair resets state and loads page 1 and the
    /// unread count once; the same pair again does nothing. No session
    /// resets immediately.
    pub async fn sync_session(&self, session: Option<&Session>) {
        let Some(session) = session else {
            let previous = self.active.lock().take();
            if previous.is_some() || self.store.snapshot().initialized {
                tracing::debug!("Session ended, clearing notifications");
            }
            self.store.reset();
            return;
        };

        let key = session.key();
        {
            let mut active = self.active.lock();
            if active.as_ref() == Some(&key) {
                return;
            }
            if active.is_some() {
                self.store.reset();
            }
            *active = Some(key);
        }

        tracing::info!(user_id = %session.user.id, "Loading notifications for session");
        self.store.dispatch(NotificationAction::SetInitialized(true));
        self.refresh().await;
    }

    /// Spawn a task applying [`Self::sync_session`] on every session change
    pub fn watch_session(&self, auth: &AuthSession) -> JoinHandle<()>
    where
        H: 'static,
    {
        let center = self.clone();
        let mut rx = auth.subscribe();
        tokio::spawn(async move {
            loop {
                let session = rx.borrow_and_update().clone();
                center.sync_session(session.as_ref()).await;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
