//! Tenant subscription and developer console payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::plan::Plan;

/// Lifecycle status asserted by the backend; unknown values are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    Other(String),
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        match raw.to_uppercase().as_str() {
            "ACTIVE" => SubscriptionStatus::Active,
            "CANCELLED" | "CANCELED" => SubscriptionStatus::Cancelled,
            "EXPIRED" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Other(raw),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.to_string()
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Active
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => f.write_str("ACTIVE"),
            SubscriptionStatus::Cancelled => f.write_str("CANCELLED"),
            SubscriptionStatus::Expired => f.write_str("EXPIRED"),
            SubscriptionStatus::Other(raw) => f.write_str(raw),
        }
    }
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// The tenant's own subscription to a platform plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSubscription {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub plan: Option<Plan>,

    #[serde(default)]
    pub status: SubscriptionStatus,

    #[serde(default, deserialize_with = "super::de::opt_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "super::de::opt_date")]
    pub end_date: Option<NaiveDate>,
}

impl TenantSubscription {
    pub fn plan_name(&self) -> Option<&str> {
        self.plan.as_ref().map(|p| p.name.as_str())
    }
}

/// `GET /dashboard`: plan, credentials, usage and services of the tenant engine.
/// The shape is backend-defined, so sections are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeveloperConsole {
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

impl DeveloperConsole {
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_unknown_values() {
        let status: SubscriptionStatus = serde_json::from_str(r#""PENDING_PAYMENT""#).unwrap();
        assert_eq!(status, SubscriptionStatus::Other("PENDING_PAYMENT".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""PENDING_PAYMENT""#);

        let cancelled: SubscriptionStatus = serde_json::from_str(r#""canceled""#).unwrap();
        assert_eq!(cancelled, SubscriptionStatus::Cancelled);
    }

    #[test]
    fn test_tenant_subscription_payload() {
        let sub: TenantSubscription = serde_json::from_str(
            r#"{
                "id": 12,
                "plan": {"id": 2, "name": "PRO", "price": 499, "durationInDays": 30, "active": true},
                "status": "ACTIVE",
                "startDate": "2025-01-01",
                "endDate": "2025-01-31T00:00:00"
            }"#,
        )
        .unwrap();
        assert!(sub.status.is_active());
        assert_eq!(sub.plan_name(), Some("PRO"));
        assert_eq!(sub.end_date, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_developer_console_keeps_sections() {
        let console: DeveloperConsole =
            serde_json::from_str(r#"{"plan": {"name": "PRO"}, "usage": {"calls": 42}}"#).unwrap();
        assert_eq!(console.section("usage").unwrap()["calls"], 42);
        assert_eq!(console.section_names().count(), 2);
    }
}
