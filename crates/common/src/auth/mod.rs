//! Auth session manager
//!
//! Provides:
//! - login / register / logout over the public client
//! - Role labelling (server claim first, administrator email as fallback)
//! - Failure mapping to user-facing messages
//!
//! Every operation resolves to an `AuthOutcome`; errors never escape.

pub mod claims;

use crate::errors::ApiError;
use crate::http::HttpClient;
use crate::models::{ApiEnvelope, LoginPayload, LoginRequest, RegisterRequest, Role, User};
use crate::session::{Session, SessionStore};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const LOGIN_PATH: &str = "/auth/log";
pub const REGISTER_PATH: &str = "/auth/reg";

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const EMAIL_NOT_REGISTERED: &str = "Email not registered. Please sign up first.";
pub const ALREADY_REGISTERED: &str = "Email already registered. Please login instead.";
pub const INVALID_INPUT: &str = "Invalid input. Please check your password requirements.";
pub const INVALID_SERVER_RESPONSE: &str = "Invalid response from server";
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const REGISTRATION_SUCCEEDED: &str = "Registration successful! Please login.";

/// Where the client stands with respect to authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    /// A login call is in flight; never persisted
    Authenticating,
    Authenticated(User),
}

/// Result descriptor handed back to views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { message: Option<String> },
    Failure { message: String },
}

impl AuthOutcome {
    fn failure(message: impl Into<String>) -> Self {
        AuthOutcome::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success { message } => message.as_deref(),
            AuthOutcome::Failure { message } => Some(message),
        }
    }
}

/// Login, registration and logout on top of the session store
pub struct AuthManager {
    public: HttpClient,
    session: Arc<SessionStore>,
    admin_email: String,
    in_flight: AtomicUsize,
}

/// Marks a login as in flight for as long as it lives
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AuthManager {
    /// `public` must be the unauthenticated client: a failed login must not
    /// be treated as an expired session.
    pub fn new(public: HttpClient, session: Arc<SessionStore>, admin_email: impl Into<String>) -> Self {
        Self {
            public,
            session,
            admin_email: admin_email.into(),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> AuthState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return AuthState::Authenticating;
        }
        match self.session.user() {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Anonymous,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().map_or(false, |u| u.role.is_admin())
    }

    /// Watch session changes (login, logout, expiry)
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.public.post::<_, LoginPayload>(LOGIN_PATH, &request).await {
            Ok(envelope) => self.complete_login(email, envelope),
            Err(e) => {
                warn!(email = %email, error = %e, "Login failed");
                AuthOutcome::failure(login_failure_message(&e))
            }
        }
    }

    fn complete_login(&self, requested_email: &str, envelope: ApiEnvelope<LoginPayload>) -> AuthOutcome {
        let message = envelope.message().map(str::to_string);
        let payload = envelope.data.unwrap_or_default();

        let Some(token) = payload.token.filter(|t| !t.is_empty()) else {
            warn!(email = %requested_email, "Login succeeded without a token");
            return AuthOutcome::failure(message.unwrap_or_else(|| INVALID_SERVER_RESPONSE.to_string()));
        };

        let email = payload
            .email
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| requested_email.to_string());
        let role = self.derive_role(&email, payload.role.as_deref(), &token);

        let session = Session {
            access_token: token,
            user: User { email: email.clone(), role },
        };

        match self.session.set(session) {
            Ok(()) => {
                info!(email = %email, role = %role, "Logged in");
                AuthOutcome::Success { message }
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Failed to persist session");
                AuthOutcome::failure(LOGIN_FAILED)
            }
        }
    }

    /// Server-asserted role first; the administrator email is only a label
    /// of last resort.
    fn derive_role(&self, email: &str, payload_role: Option<&str>, token: &str) -> Role {
        if let Some(role) = payload_role.filter(|r| !r.trim().is_empty()) {
            return Role::from_claim(role);
        }
        if let Some(role) = claims::role_from_token(token) {
            return role;
        }
        if email == self.admin_email {
            Role::Administrator
        } else {
            Role::Standard
        }
    }

    /// Register a tenant. Never authenticates; the caller sends the user to login.
    pub async fn register(&self, request: RegisterRequest) -> AuthOutcome {
        let email = request.email.clone();

        match self.public.post::<_, Value>(REGISTER_PATH, &request).await {
            Ok(envelope) => {
                info!(email = %email, "Registered");
                AuthOutcome::Success {
                    message: Some(
                        envelope
                            .message()
                            .unwrap_or(REGISTRATION_SUCCEEDED)
                            .to_string(),
                    ),
                }
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Registration failed");
                AuthOutcome::failure(register_failure_message(&e))
            }
        }
    }

    /// Clear the session. Idempotent and infallible.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }
}

fn mentions_duplicate(text: &str) -> bool {
    text.to_lowercase().contains("duplicate")
}

/// The error's own description, for failures that carry a status.
/// Transport and decoding details never reach the user.
fn own_message(err: &ApiError) -> Option<String> {
    match err {
        ApiError::Status { .. } | ApiError::Unauthorized { .. } => Some(err.to_string()),
        _ => None,
    }
}

/// Message for a failed login
pub fn login_failure_message(err: &ApiError) -> String {
    match err.status() {
        Some(401) => INVALID_CREDENTIALS.to_string(),
        Some(404) => EMAIL_NOT_REGISTERED.to_string(),
        _ => err
            .server_message()
            .or_else(|| err.server_error())
            .map(str::to_string)
            .or_else(|| own_message(err))
            .unwrap_or_else(|| LOGIN_FAILED.to_string()),
    }
}

/// Message for a failed registration
pub fn register_failure_message(err: &ApiError) -> String {
    let duplicate_body = err.server_message().map_or(false, mentions_duplicate)
        || err.server_error().map_or(false, mentions_duplicate);

    match err.status() {
        Some(409) => ALREADY_REGISTERED.to_string(),
        Some(500) if duplicate_body => ALREADY_REGISTERED.to_string(),
        Some(400) => err.server_message().unwrap_or(INVALID_INPUT).to_string(),
        _ => {
            if let Some(message) = err.server_message().or_else(|| err.server_error()) {
                return message.to_string();
            }
            match own_message(err) {
                Some(message) if mentions_duplicate(&message) => ALREADY_REGISTERED.to_string(),
                Some(message) => message,
                None => REGISTRATION_FAILED.to_string(),
            }
        }
    }
}
