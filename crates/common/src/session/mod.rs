//! Session store
//!
//! Provides:
//! - The persisted `(token, user)` pair behind one injected service
//! - `get` / `set` / `clear` that keep both entries in lockstep
//! - Change notification for anything that renders session state

mod backend;

pub use backend::{FileBackend, MemoryBackend, SessionBackend, SessionKey};

use crate::errors::Result;
use crate::models::User;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// An authenticated session: the bearer token and who it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Single owner of the persisted session entries
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    state: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Open the store and hydrate from persisted entries.
    ///
    /// No backend round trip happens here: a stale token is only discovered
    /// when an authenticated call comes back unauthorized.
    pub fn open(backend: Arc<dyn SessionBackend>) -> Self {
        let initial = Self::hydrate(backend.as_ref());
        let (state, _) = watch::channel(initial);
        Self { backend, state }
    }

    /// Store backed by the in-memory backend
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryBackend::default()))
    }

    fn hydrate(backend: &dyn SessionBackend) -> Option<Session> {
        let token = read_entry(backend, SessionKey::Token);
        let user = read_entry(backend, SessionKey::User);

        match (token, user) {
            (None, None) => None,
            (Some(access_token), Some(raw_user)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => {
                    info!(email = %user.email, role = %user.role, "Restored persisted session");
                    Some(Session { access_token, user })
                }
                Err(e) => {
                    warn!(error = %e, "Persisted user record is unreadable, discarding session");
                    remove_entries(backend);
                    None
                }
            },
            _ => {
                warn!("Only one of token/user was persisted, discarding the stray entry");
                remove_entries(backend);
                None
            }
        }
    }

    /// Current session, if any
    pub fn get(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.access_token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Persist both entries, then publish the new session.
    ///
    /// A failed write leaves no session at all, on disk or in memory.
    pub fn set(&self, session: Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;

        let written = self
            .backend
            .write(SessionKey::Token, &session.access_token)
            .and_then(|()| self.backend.write(SessionKey::User, &user_json));
        if let Err(e) = written {
            warn!(error = %e, "Failed to persist session, clearing both entries");
            self.clear();
            return Err(e.into());
        }

        debug!(email = %session.user.email, "Session persisted");
        self.state.send_replace(Some(session));
        Ok(())
    }

    /// Remove both entries. Idempotent; storage errors are logged, not returned.
    pub fn clear(&self) {
        remove_entries(self.backend.as_ref());
        self.state.send_if_modified(|current| current.take().is_some());
    }

    /// Watch session changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}

fn read_entry(backend: &dyn SessionBackend, key: SessionKey) -> Option<String> {
    match backend.read(key) {
        Ok(value) => value.filter(|v| !v.trim().is_empty()),
        Err(e) => {
            warn!(key = ?key, error = %e, "Failed to read session entry");
            None
        }
    }
}

fn remove_entries(backend: &dyn SessionBackend) {
    for key in [SessionKey::Token, SessionKey::User] {
        if let Err(e) = backend.remove(key) {
            warn!(key = ?key, error = %e, "Failed to remove session entry");
        }
    }
}
