//! Notification state and its reducer
//!
//! `reduce` is pure: every change to notification state, whether it came
//! from a REST response or a socket push, is expressed as a
//! [`NotificationAction`] and applied here.

use shared::models::Notification;
use shared::util::now;

/// Notification list state, newest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    /// Last page loaded (0 before the first fetch)
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once the first fetch for the current session was issued
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationAction {
    SetLoading(bool),
    SetError(Option<String>),
    /// Replace the whole list (first page)
    ReplaceList(Vec<Notification>),
    /// Append a further page
    AppendList(Vec<Notification>),
    /// Prepend one pushed notification
    AddOne(Notification),
    UpdateOne(Notification),
    RemoveOne(String),
    SetUnreadCount(u64),
    MarkOneRead(String),
    MarkAllRead,
    SetPage(u32),
    SetHasMore(bool),
    SetInitialized(bool),
    Reset,
}

impl NotificationAction {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationAction::SetLoading(_) => "set_loading",
            NotificationAction::SetError(_) => "set_error",
            NotificationAction::ReplaceList(_) => "replace_list",
            NotificationAction::AppendList(_) => "append_list",
            NotificationAction::AddOne(_) => "add_one",
            NotificationAction::UpdateOne(_) => "update_one",
            NotificationAction::RemoveOne(_) => "remove_one",
            NotificationAction::SetUnreadCount(_) => "set_unread_count",
            NotificationAction::MarkOneRead(_) => "mark_one_read",
            NotificationAction::MarkAllRead => "mark_all_read",
            NotificationAction::SetPage(_) => "set_page",
            NotificationAction::SetHasMore(_) => "set_has_more",
            NotificationAction::SetInitialized(_) => "set_initialized",
            NotificationAction::Reset => "reset",
        }
    }
}

/// Next state for `action`
pub fn reduce(state: &NotificationState, action: NotificationAction) -> NotificationState {
    let mut next = state.clone();
    next.apply(action);
    next
}

impl NotificationState {
    pub fn contains(&self, id: &str) -> bool {
        self.notifications.iter().any(|n| n.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Unread items among those loaded
    pub fn loaded_unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    /// Apply `action` in place
    pub fn apply(&mut self, action: NotificationAction) {
        match action {
            NotificationAction::SetLoading(loading) => self.loading = loading,
            NotificationAction::SetError(error) => {
                self.error = error;
                self.loading = false;
            }
            NotificationAction::ReplaceList(list) => {
                self.notifications = list;
                self.error = None;
            }
            NotificationAction::AppendList(list) => {
                for n in list {
                    if !self.contains(&n.id) {
                        self.notifications.push(n);
                    }
                }
                self.error = None;
            }
            NotificationAction::AddOne(n) => {
                if !self.contains(&n.id) {
                    self.notifications.insert(0, n);
                }
            }
            NotificationAction::UpdateOne(updated) => {
                if let Some(slot) = self.notifications.iter_mut().find(|n| n.id == updated.id) {
                    *slot = updated;
                }
            }
            NotificationAction::RemoveOne(id) => {
                if let Some(idx) = self.notifications.iter().position(|n| n.id == id) {
                    let removed = self.notifications.remove(idx);
                    if !removed.is_read {
                        self.unread_count = self.unread_count.saturating_sub(1);
                    }
                }
            }
            NotificationAction::SetUnreadCount(count) => self.unread_count = count,
            NotificationAction::MarkOneRead(id) => {
                match self.notifications.iter_mut().find(|n| n.id == id) {
                    Some(n) if n.is_read => {}
                    Some(n) => {
                        n.mark_read(now());
                        self.unread_count = self.unread_count.saturating_sub(1);
                    }
                    // Not loaded, but the server confirmed the transition
                    None => self.unread_count = self.unread_count.saturating_sub(1),
                }
            }
            NotificationAction::MarkAllRead => {
                let at = now();
                for n in self.notifications.iter_mut().filter(|n| !n.is_read) {
                    n.mark_read(at);
                }
                self.unread_count = 0;
            }
            NotificationAction::SetPage(page) => self.page = page,
            NotificationAction::SetHasMore(has_more) => self.has_more = has_more,
            NotificationAction::SetInitialized(initialized) => self.initialized = initialized,
            NotificationAction::Reset => *self = NotificationState::default(),
        }
    }
}
