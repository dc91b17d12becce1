//! Personal subscription tracking: recurring expenses recorded by the user

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::subscription::SubscriptionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Yearly,
}

impl Default for BillingCycle {
    fn default() -> Self {
        BillingCycle::Monthly
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BillingCycle::Weekly => "WEEKLY",
            BillingCycle::Monthly => "MONTHLY",
            BillingCycle::Yearly => "YEARLY",
        })
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WEEKLY" => Ok(BillingCycle::Weekly),
            "MONTHLY" => Ok(BillingCycle::Monthly),
            "YEARLY" => Ok(BillingCycle::Yearly),
            other => Err(format!("unknown billing cycle: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,

    #[serde(default, alias = "categoryName")]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tracked recurring expense as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSubscription {
    pub id: i64,

    pub subscription_name: String,

    #[serde(deserialize_with = "super::de::decimal")]
    pub amount: f64,

    #[serde(default)]
    pub billing_cycle: BillingCycle,

    #[serde(default, alias = "category")]
    pub subscription_category: Option<Category>,

    #[serde(default, deserialize_with = "super::de::opt_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "super::de::opt_date")]
    pub next_billing_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: SubscriptionStatus,
}

/// Body of create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSubscriptionRequest {
    #[validate(length(min = 1, message = "Subscription name is required"))]
    pub subscription_name: String,

    #[validate(
        range(exclusive_min = 0.0, message = "Amount must be greater than zero"),
        custom(function = "crate::validation::validate_finite")
    )]
    pub amount: f64,

    pub billing_cycle: BillingCycle,

    pub start_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `GET /user-Subscriptions/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    #[serde(default, deserialize_with = "super::de::opt_decimal")]
    pub total_monthly_cost: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `GET /user-Subscriptions/insights`: usually a sentence,
/// sometimes an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insight {
    Text(String),
    Detail(Map<String, Value>),
}

impl Insight {
    /// Human-readable text; for objects, the first known text field
    pub fn text(&self) -> Option<&str> {
        match self {
            Insight::Text(text) => Some(text),
            Insight::Detail(fields) => ["message", "text", "description", "title"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_subscription_payload() {
        let sub: TrackedSubscription = serde_json::from_str(
            r#"{
                "id": 7,
                "subscriptionName": "Netflix",
                "amount": 649,
                "billingCycle": "MONTHLY",
                "subscriptionCategory": {"id": 1, "name": "Entertainment"},
                "startDate": "2025-02-01",
                "nextBillingDate": "2025-03-01",
                "status": "ACTIVE"
            }"#,
        )
        .unwrap();
        assert_eq!(sub.billing_cycle, BillingCycle::Monthly);
        assert_eq!(sub.subscription_category.as_ref().unwrap().name, "Entertainment");
        assert_eq!(sub.next_billing_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(sub.start_date, NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn test_request_wire_format() {
        let request = TrackedSubscriptionRequest {
            subscription_name: "Spotify".into(),
            amount: 119.0,
            billing_cycle: BillingCycle::Yearly,
            start_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            category: None,
            notes: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["subscriptionName"], "Spotify");
        assert_eq!(json["billingCycle"], "YEARLY");
        assert_eq!(json["startDate"], "2025-04-09");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_request_rejects_zero_amount() {
        let request = TrackedSubscriptionRequest {
            subscription_name: "Gym".into(),
            amount: 0.0,
            billing_cycle: BillingCycle::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            category: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_billing_cycle_parse() {
        assert_eq!("weekly".parse::<BillingCycle>(), Ok(BillingCycle::Weekly));
        assert!("daily".parse::<BillingCycle>().is_err());
    }

    #[test]
    fn test_insight_text_and_stats() {
        let insight: Insight =
            serde_json::from_str(r#"{"type": "SAVING", "message": "Two music services"}"#).unwrap();
        assert_eq!(insight.text(), Some("Two music services"));
        let plain: Insight = serde_json::from_str(r#""You spend most on Entertainment""#).unwrap();
        assert_eq!(plain.text(), Some("You spend most on Entertainment"));

        let stats: SubscriptionStats =
            serde_json::from_str(r#"{"totalMonthlyCost": "1200.5", "activeCount": 4}"#).unwrap();
        assert_eq!(stats.total_monthly_cost, Some(1200.5));
        assert_eq!(stats.extra["activeCount"], 4);
    }
}
