//! Aggregated page loads
//!
//! The dashboard and the personal subscriptions page each issue several
//! independent reads at once. Every read keeps its own result so one
//! failure never hides the others.

use super::{subscriptions, tracker};
use crate::errors::Result;
use crate::http::HttpClient;
use crate::models::{Category, Insight, SubscriptionStats, TenantSubscription, TrackedSubscription};
use crate::navigation::SessionController;
use tracing::debug;

/// Rows of personal subscriptions shown on the dashboard
pub const DASHBOARD_PREVIEW_LEN: usize = 5;

/// Reads behind the developer dashboard
#[derive(Debug)]
pub struct DashboardData {
    pub plan_subscription: Result<Option<TenantSubscription>>,
    pub stats: Result<Option<SubscriptionStats>>,
    pub personal: Result<Vec<TrackedSubscription>>,
    pub insights: Result<Vec<Insight>>,
    pub upcoming: Result<Vec<TrackedSubscription>>,
}

impl DashboardData {
    /// Number of reads that failed
    pub fn failures(&self) -> usize {
        [
            self.plan_subscription.is_err(),
            self.stats.is_err(),
            self.personal.is_err(),
            self.insights.is_err(),
            self.upcoming.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    /// First personal subscriptions, for the dashboard preview
    pub fn personal_preview(&self) -> &[TrackedSubscription] {
        match &self.personal {
            Ok(subs) => &subs[..subs.len().min(DASHBOARD_PREVIEW_LEN)],
            Err(_) => &[],
        }
    }
}

/// Reads behind the personal subscriptions page
#[derive(Debug)]
pub struct PersonalData {
    pub subscriptions: Result<Vec<TrackedSubscription>>,
    pub stats: Result<Option<SubscriptionStats>>,
    pub insights: Result<Vec<Insight>>,
    pub upcoming: Result<Vec<TrackedSubscription>>,
    pub categories: Result<Vec<Category>>,
}

impl PersonalData {
    pub fn failures(&self) -> usize {
        [
            self.subscriptions.is_err(),
            self.stats.is_err(),
            self.insights.is_err(),
            self.upcoming.is_err(),
            self.categories.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Load the dashboard: plan subscription, stats, personal list, insights
/// and renewals in the next week
pub async fn load_dashboard(client: &HttpClient, controller: &SessionController) -> DashboardData {
    let (plan_subscription, stats, personal, insights, upcoming) = futures::join!(
        subscriptions::current(client),
        tracker::stats(client),
        tracker::list(client),
        tracker::insights(client),
        tracker::upcoming(client, tracker::DEFAULT_UPCOMING_DAYS)
    );

    let data = DashboardData {
        plan_subscription: controller.handle(plan_subscription),
        stats: controller.handle(stats),
        personal: controller.handle(personal),
        insights: controller.handle(insights),
        upcoming: controller.handle(upcoming),
    };
    debug!(failures = data.failures(), "Dashboard loaded");
    data
}

/// Load the personal subscriptions page
pub async fn load_personal(client: &HttpClient, controller: &SessionController) -> PersonalData {
    let (subscriptions, stats, insights, upcoming, categories) = futures::join!(
        tracker::list(client),
        tracker::stats(client),
        tracker::insights(client),
        tracker::upcoming(client, tracker::DEFAULT_UPCOMING_DAYS),
        tracker::categories(client)
    );

    let data = PersonalData {
        subscriptions: controller.handle(subscriptions),
        stats: controller.handle(stats),
        insights: controller.handle(insights),
        upcoming: controller.handle(upcoming),
        categories: controller.handle(categories),
    };
    debug!(failures = data.failures(), "Personal subscriptions loaded");
    data
}
