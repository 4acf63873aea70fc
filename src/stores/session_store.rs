use crate::core::error::StorageError;
use crate::models::user::User;
use crate::stores::token_store::{MemoryTokenStore, TokenStore};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, warn};

/// Stream of current-user snapshots
///
/// Yields the snapshot at subscription time first, then every replacement.
/// Slow consumers skip intermediate values but always observe the latest one.
pub type UserStream = WatchStream<Option<User>>;

/// Single source of truth for "who is logged in"
///
/// Owns the persisted token (through a [`TokenStore`]) and the in-memory
/// current-user snapshot. Shared as `Arc<SessionStore>`.
pub struct SessionStore {
    tokens: Arc<dyn TokenStore>,
    current_user: watch::Sender<Option<User>>,
}

impl SessionStore {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (current_user, _) = watch::channel(None);
        Self {
            tokens,
            current_user,
        }
    }

    /// Session backed by a process-local token slot
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Persisted credential, `None` when absent or unreadable
    pub fn get_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, treating session as anonymous");
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.tokens.save(token).map_err(|e| {
            error!(error = %e, "Failed to persist session token");
            e
        })?;
        debug!("Session token stored");
        Ok(())
    }

    pub fn clear_token(&self) {
        match self.tokens.remove() {
            Ok(()) => debug!("Session token removed"),
            Err(e) => error!(error = %e, "Failed to remove stored session token"),
        }
    }

    /// Token presence only; an expired token still counts until the backend
    /// rejects it
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// Cached snapshot, never triggers a request
    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    /// Replace the snapshot and notify every subscriber
    pub fn set_current_user(&self, user: Option<User>) {
        debug!(user_id = ?user.as_ref().map(|u| u.id), "Current user replaced");
        self.current_user.send_replace(user);
    }

    pub fn subscribe(&self) -> UserStream {
        WatchStream::new(self.current_user.subscribe())
    }

    /// Raw receiver for consumers that want `changed()`/`borrow()` semantics
    pub fn watch(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    /// Drop the token and the snapshot
    pub fn clear(&self) {
        self.clear_token();
        self.set_current_user(None);
    }
}
