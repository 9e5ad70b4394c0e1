//! Authentication session
//!
//! The token and user are resolved once, synchronously, when the session is
//! restored from persistent storage. Every consumer (HTTP client, socket,
//! notification center) reads the same watch channel afterwards, so there
//! is never a second "fallback" read of storage.

use shared::models::User;
use std::sync::Arc;
use tokio::sync::watch;

use crate::storage::{KEY_TOKEN, KEY_USER, Storage, StorageError, StorageExt};

/// Signed-in state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Identity of a session for "one connection per (token, user)" guards
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub token: String,
    pub user_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            token: self.token.clone(),
            user_id: self.user.id.clone(),
        }
    }

    /// Authorization header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Shared authentication state
#[derive(Debug, Clone)]
pub struct AuthSession {
    storage: Arc<dyn Storage>,
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl AuthSession {
    /// Restore from persistent storage
    ///
    /// A half-written or unreadable entry counts as signed out; it is
    /// logged and left for the next `sign_in` to overwrite.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let session = match Self::read_persisted(storage.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to restore auth session: {}", e);
                None
            }
        };

        if let Some(ref s) = session {
            tracing::info!(user_id = %s.user.id, "Restored auth session");
        }

        let (tx, _) = watch::channel(session);
        Self {
            storage,
            tx: Arc::new(tx),
        }
    }

    fn read_persisted(storage: &dyn Storage) -> Result<Option<Session>, StorageError> {
        let token: Option<String> = storage.load_json(KEY_TOKEN)?;
        let user: Option<User> = storage.load_json(KEY_USER)?;
        Ok(match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => Some(Session { token, user }),
            _ => None,
        })
    }

    /// Persist and publish a new session
    pub fn sign_in(&self, token: impl Into<String>, user: User) -> Result<(), StorageError> {
        let session = Session::new(token, user);
        self.storage.save_json(KEY_TOKEN, &session.token)?;
        self.storage.save_json(KEY_USER, &session.user)?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.tx.send_replace(Some(session));
        Ok(())
    }

    /// Clear persisted credentials and publish the signed-out state
    ///
    /// The in-memory state is cleared even when storage fails.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        let previous = self.tx.send_replace(None);
        if let Some(s) = previous {
            tracing::info!(user_id = %s.user.id, "Signed out");
        }
        self.storage.remove(KEY_TOKEN)?;
        self.storage.remove(KEY_USER)?;
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.tx.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Follow session changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}
