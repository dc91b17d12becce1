//! SubSphere Client Library
//!
//! Client side of the SubSphere subscription platform:
//! - HTTP client contract (authenticated and public variants)
//! - Session store with change notification
//! - Auth session manager (login, register, logout)
//! - Resource access modules for plans, subscriptions, tracking and admin
//! - Navigation model and the session controller
//! - Client-side form validation
//! - Configuration, error types and metrics

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod models;
pub mod navigation;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthManager, AuthOutcome, AuthState};
pub use client::SubsphereClient;
pub use config::AppConfig;
pub use errors::{ApiError, ClientKind, ErrorKind, Result};
pub use http::{HttpClient, Transport};
pub use navigation::{Navigator, SessionController, View};
pub use session::{Session, SessionStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend origin used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "https://saassubscription-production.up.railway.app/api";

/// Account labelled administrator when the server asserts no role
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@subsphere.io";
