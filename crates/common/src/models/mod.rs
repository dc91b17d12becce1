//! Wire models for the SubSphere backend

pub mod de;
pub mod envelope;
pub mod plan;
pub mod subscription;
pub mod tracker;
pub mod user;

pub use envelope::{ApiEnvelope, ErrorBody};
pub use plan::{CreatePlanRequest, Plan, PlanFeature};
pub use subscription::{DeveloperConsole, SubscriptionStatus, TenantSubscription};
pub use tracker::{
    BillingCycle, Category, Insight, SubscriptionStats, TrackedSubscription,
    TrackedSubscriptionRequest,
};
pub use user::{AdminUser, LoginPayload, LoginRequest, RegisterRequest, Role, User};
