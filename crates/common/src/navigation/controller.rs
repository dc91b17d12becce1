//! Session controller
//!
//! The only component that reacts to an expired session. The transport
//! reports `Unauthorized`; this decides whether that means "log out and go
//! to login" based on the current view.

use super::{Navigator, View};
use crate::errors::Result;
use crate::metrics;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::info;

pub struct SessionController {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl SessionController {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Inspect a call result. An authenticated-client 401 outside the
    /// auth-entry views clears the session and navigates to login once.
    /// The result is returned unchanged either way.
    pub fn handle<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_session_expiry() && !self.navigator.current().is_auth_entry() {
                self.expire();
            }
        }
        result
    }

    fn expire(&self) {
        let was_signed_in = self.session.is_authenticated();
        self.session.clear();
        metrics::record_session_expired();
        info!(from = %self.navigator.current(), was_signed_in, "Session expired, returning to login");
        self.navigator.navigate(View::Login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ApiError, ClientKind};
    use crate::models::{Role, User};
    use crate::session::{MemoryBackend, Session};

    struct Harness {
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
        backend: Arc<MemoryBackend>,
        controller: SessionController,
    }

    fn harness(start: View) -> Harness {
        let backend = Arc::new(MemoryBackend::default());
        let session = Arc::new(SessionStore::open(backend.clone()));
        session
            .set(Session {
                access_token: "expired".into(),
                user: User {
                    email: "jo@acme.io".into(),
                    role: Role::Standard,
                },
            })
            .unwrap();
        let navigator = Arc::new(Navigator::new(start));
        Harness {
            controller: SessionController::new(session.clone(), navigator.clone()),
            session,
            navigator,
            backend,
        }
    }

    fn unauthorized(client: ClientKind) -> Result<()> {
        Err(ApiError::Unauthorized {
            client,
            message: None,
        })
    }

    #[test]
    fn test_expiry_on_protected_view() {
        let h = harness(View::Dashboard);

        let result = h.controller.handle(unauthorized(ClientKind::Authenticated));

        assert!(result.unwrap_err().is_session_expiry());
        assert!(!h.session.is_authenticated());
        assert!(h.backend.is_empty());
        assert_eq!(h.navigator.current(), View::Login);
        assert_eq!(h.navigator.navigation_count(), 1);
    }

    #[test]
    fn test_auth_entry_view_keeps_session() {
        for view in [View::Login, View::Register, View::Auth] {
            let h = harness(view);
            let _ = h.controller.handle(unauthorized(ClientKind::Authenticated));

            assert!(h.session.is_authenticated());
            assert_eq!(h.navigator.current(), view);
            assert_eq!(h.navigator.navigation_count(), 0);
        }
    }

    #[test]
    fn test_public_client_failure_untouched() {
        let h = harness(View::Dashboard);
        let _ = h.controller.handle(unauthorized(ClientKind::Public));

        assert!(h.session.is_authenticated());
        assert_eq!(h.navigator.navigation_count(), 0);
    }

    #[test]
    fn test_other_outcomes_pass_through() {
        let h = harness(View::Admin);
        assert_eq!(h.controller.handle(Ok(5)).unwrap(), 5);

        let forbidden: Result<()> = Err(ApiError::Status {
            status: 403,
            message: None,
            error: None,
        });
        assert!(h.controller.handle(forbidden).is_err());
        assert!(h.session.is_authenticated());
    }
}
