//! Public plan catalogue

use super::data_list;
use crate::errors::Result;
use crate::http::HttpClient;
use crate::models::Plan;

pub const PUBLIC_PLANS_PATH: &str = "/public";

/// `GET /public` on the public client
pub async fn list_public_plans(public: &HttpClient) -> Result<Vec<Plan>> {
    data_list(public.get(PUBLIC_PLANS_PATH).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, ScriptedTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_public_plans() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            PUBLIC_PLANS_PATH,
            200,
            json!({
                "message": "Plans fetched",
                "data": [
                    {"id": 1, "name": "BASIC", "price": 0, "durationInDays": 30, "active": true, "features": ["1 project"]},
                    {"id": 2, "name": "PRO", "price": "19.99", "durationInDays": 30, "active": true}
                ]
            }),
        );
        let client = HttpClient::public("https://backend.test/api", transport.clone());

        let plans = list_public_plans(&client).await.unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].features[0].text, "1 project");
        assert!(plans[1].is_featured());
        assert_eq!(plans[1].price, 19.99);
        assert_eq!(transport.requests()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Get, PUBLIC_PLANS_PATH, 200, json!({"message": "none"}));
        let client = HttpClient::public("https://backend.test/api", transport);

        assert!(list_public_plans(&client).await.unwrap().is_empty());
    }
}
