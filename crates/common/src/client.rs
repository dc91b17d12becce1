//! Wiring of the client components from configuration

use crate::auth::AuthManager;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::http::{HttpClient, ReqwestTransport, Transport};
use crate::navigation::{Navigator, SessionController, View};
use crate::session::{FileBackend, SessionBackend, SessionStore};
use std::sync::Arc;
use tracing::info;

/// Every client component, sharing one session store and one navigator
pub struct SubsphereClient {
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub controller: SessionController,
    pub auth: AuthManager,
    /// Attaches the bearer token
    pub api: HttpClient,
    /// Never attaches a token
    pub public: HttpClient,
}

impl SubsphereClient {
    /// Build with the reqwest transport and the file-backed session directory
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        let backend = Arc::new(FileBackend::new(config.session.dir.clone()));
        info!(
            base_url = %config.base_url(),
            session_dir = %config.session.dir.display(),
            "Client configured"
        );
        Ok(Self::with_parts(config, transport, backend))
    }

    /// Build with explicit transport and session backend
    pub fn with_parts(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        backend: Arc<dyn SessionBackend>,
    ) -> Self {
        let session = Arc::new(SessionStore::open(backend));
        let navigator = Arc::new(Navigator::new(View::Landing));
        let api = HttpClient::authenticated(config.base_url(), transport.clone(), session.clone());
        let public = HttpClient::public(config.base_url(), transport);

        Self {
            controller: SessionController::new(session.clone(), navigator.clone()),
            auth: AuthManager::new(public.clone(), session.clone(), config.auth.admin_email.clone()),
            session,
            navigator,
            api,
            public,
        }
    }

    /// Run an authenticated call through the session controller
    pub fn guarded<T>(&self, result: Result<T>) -> Result<T> {
        self.controller.handle(result)
    }

    /// Navigate through the protected-route rules
    pub fn visit(&self, view: View) -> View {
        self.navigator.visit(view, self.session.user().as_ref())
    }
}
