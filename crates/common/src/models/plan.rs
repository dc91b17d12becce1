//! Plan entity and admin plan requests

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A purchasable tier; owned and mutated by the backend only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: i64,

    pub name: String,

    #[serde(deserialize_with = "super::de::decimal")]
    pub price: f64,

    pub duration_in_days: u32,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub features: Vec<PlanFeature>,
}

impl Plan {
    /// Highlighted tiers on the pricing view
    pub fn is_featured(&self) -> bool {
        let name = self.name.to_uppercase();
        name == "PREMIUM" || name == "PRO"
    }

    pub fn period_label(&self) -> String {
        format!("/{} days", self.duration_in_days)
    }
}

/// One line of a plan's feature list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFeature")]
pub struct PlanFeature {
    pub text: String,
    pub included: bool,
}

/// Features arrive either as bare strings or as `{ text, included }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeature {
    Text(String),
    Full {
        text: String,
        #[serde(default = "included_by_default")]
        included: bool,
    },
}

fn included_by_default() -> bool {
    true
}

impl From<RawFeature> for PlanFeature {
    fn from(raw: RawFeature) -> Self {
        match raw {
            RawFeature::Text(text) => PlanFeature { text, included: true },
            RawFeature::Full { text, included } => PlanFeature { text, included },
        }
    }
}

/// Body of `POST /admin/plan`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, message = "Plan name is required"))]
    pub name: String,

    #[validate(
        range(min = 0.0, message = "Price cannot be negative"),
        custom(function = "crate::validation::validate_finite")
    )]
    pub price: f64,

    #[validate(range(min = 1, message = "Duration must be at least one day"))]
    pub duration_in_days: u32,
}
