//! Views and navigation
//!
//! `Navigator` holds the current view, the console's equivalent of the
//! browser location. The session controller reads it to decide whether an
//! unauthorized response should send the user back to login.
//!
//! A protected view that bounced an anonymous visitor to login is kept as
//! the pending destination for as long as the visitor stays on the
//! auth-entry views.

pub mod controller;

pub use controller::SessionController;

use crate::models::User;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Login,
    Register,
    Auth,
    Pricing,
    Dashboard,
    MySubscriptions,
    Admin,
}

impl View {
    pub const ALL: [View; 8] = [
        View::Landing,
        View::Login,
        View::Register,
        View::Auth,
        View::Pricing,
        View::Dashboard,
        View::MySubscriptions,
        View::Admin,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Landing => "/",
            View::Login => "/login",
            View::Register => "/register",
            View::Auth => "/auth",
            View::Pricing => "/pricing",
            View::Dashboard => "/dashboard",
            View::MySubscriptions => "/my-subscriptions",
            View::Admin => "/admin",
        }
    }

    /// Destination carried by a `?redirect=` query, e.g. `/login?redirect=/admin`
    pub fn redirect_target(path: &str) -> Option<View> {
        let (_, query) = path.split_once('?')?;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("redirect="))
            .filter(|target| target.starts_with('/'))
            .map(View::from_path)
    }

    /// Resolve a path; unknown paths land on the landing view
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        View::ALL
            .into_iter()
            .find(|view| view.path() == path)
            .unwrap_or(View::Landing)
    }

    /// Views where a 401 is a credential failure rather than an expiry
    pub fn is_auth_entry(&self) -> bool {
        matches!(self, View::Login | View::Register | View::Auth)
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, View::Dashboard | View::MySubscriptions | View::Admin)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, View::Admin)
    }

    /// Where a visitor actually lands when asking for this view
    pub fn guard(self, user: Option<&User>) -> View {
        match user {
            None if self.requires_session() => View::Login,
            Some(user) if self.requires_admin() && !user.role.is_admin() => View::Dashboard,
            _ => self,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Current view with change notification
pub struct Navigator {
    current: watch::Sender<View>,
    pending: watch::Sender<Option<View>>,
    navigations: AtomicUsize,
}

impl Navigator {
    pub fn new(start: View) -> Self {
        let (current, _) = watch::channel(start);
        let (pending, _) = watch::channel(None);
        Self {
            current,
            pending,
            navigations: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> View {
        *self.current.borrow()
    }

    pub fn navigate(&self, view: View) {
        debug!(from = %self.current(), to = %view, "Navigating");
        if !view.is_auth_entry() {
            self.pending.send_replace(None);
        }
        self.navigations.fetch_add(1, Ordering::SeqCst);
        self.current.send_replace(view);
    }

    /// Navigate through the protected-route rules; returns the view reached
    pub fn visit(&self, requested: View, user: Option<&User>) -> View {
        let view = requested.guard(user);
        self.navigate(view);
        if view == View::Login && requested != View::Login {
            self.set_pending(requested);
        }
        view
    }

    /// Remember where to go once the visitor has signed in
    pub fn set_pending(&self, view: View) {
        debug!(destination = %view, "Holding destination until login");
        self.pending.send_replace(Some(view));
    }

    pub fn pending(&self) -> Option<View> {
        *self.pending.borrow()
    }

    /// Consume the pending destination
    pub fn take_pending(&self) -> Option<View> {
        self.pending.send_replace(None)
    }

    /// Number of navigations performed so far
    pub fn navigation_count(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.current.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(View::Landing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(role: Role) -> User {
        User {
            email: "jo@acme.io".into(),
            role,
        }
    }

    #[test]
    fn test_paths() {
        for view in View::ALL {
            assert_eq!(View::from_path(view.path()), view);
        }
        assert_eq!(View::from_path("/dashboard/"), View::Dashboard);
        assert_eq!(View::from_path("/login?next=/admin"), View::Login);
        assert_eq!(View::from_path("/nowhere"), View::Landing);
        assert_eq!(View::from_path(""), View::Landing);
    }

    #[test]
    fn test_auth_entry_views() {
        let entries: Vec<View> = View::ALL.into_iter().filter(View::is_auth_entry).collect();
        assert_eq!(entries, vec![View::Login, View::Register, View::Auth]);
    }

    #[test]
    fn test_protected_routes() {
        assert_eq!(View::Dashboard.guard(None), View::Login);
        assert_eq!(View::MySubscriptions.guard(None), View::Login);
        assert_eq!(View::Admin.guard(None), View::Login);
        assert_eq!(View::Pricing.guard(None), View::Pricing);

        let standard = user(Role::Standard);
        assert_eq!(View::Admin.guard(Some(&standard)), View::Dashboard);
        assert_eq!(View::MySubscriptions.guard(Some(&standard)), View::MySubscriptions);

        let admin = user(Role::Administrator);
        assert_eq!(View::Admin.guard(Some(&admin)), View::Admin);
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(
            View::redirect_target("/login?redirect=/my-subscriptions"),
            Some(View::MySubscriptions)
        );
        assert_eq!(View::redirect_target("/login?x=1&redirect=/"), Some(View::Landing));
        assert_eq!(View::redirect_target("/login"), None);
        assert_eq!(View::redirect_target("/login?redirect=http://evil.io"), None);
    }

    #[test]
    fn test_guarded_destination_is_remembered() {
        let navigator = Navigator::default();

        assert_eq!(navigator.visit(View::MySubscriptions, None), View::Login);
        assert_eq!(navigator.pending(), Some(View::MySubscriptions));

        // still pending while moving between the auth-entry views
        navigator.navigate(View::Register);
        navigator.navigate(View::Login);
        assert_eq!(navigator.take_pending(), Some(View::MySubscriptions));
        assert_eq!(navigator.take_pending(), None);
    }

    #[test]
    fn test_leaving_auth_views_drops_destination() {
        let navigator = Navigator::default();
        navigator.visit(View::Dashboard, None);

        navigator.visit(View::Pricing, None);

        assert_eq!(navigator.pending(), None);
    }

    #[tokio::test]
    async fn test_navigation_is_published() {
        let navigator = Navigator::default();
        let mut rx = navigator.subscribe();

        let reached = navigator.visit(View::Admin, None);

        assert_eq!(reached, View::Login);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), View::Login);
        assert_eq!(navigator.navigation_count(), 1);
    }
}
