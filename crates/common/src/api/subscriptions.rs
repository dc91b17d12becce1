//! Tenant subscription lifecycle and the developer console

use super::data_item;
use crate::errors::Result;
use crate::http::HttpClient;
use crate::models::{ApiEnvelope, DeveloperConsole, TenantSubscription};
use serde_json::Value;

pub const SUBSCRIPTIONS_PATH: &str = "/subscriptions";
pub const CANCEL_PATH: &str = "/subscriptions/cancel";
pub const CONSOLE_PATH: &str = "/dashboard";

/// `POST /subscriptions/subscribe/{planId}`
pub async fn subscribe(client: &HttpClient, plan_id: i64) -> Result<ApiEnvelope<Value>> {
    client
        .post_empty(&format!("{}/subscribe/{}", SUBSCRIPTIONS_PATH, plan_id))
        .await
}

/// `GET /subscriptions`; `None` when the tenant has no subscription
pub async fn current(client: &HttpClient) -> Result<Option<TenantSubscription>> {
    data_item(client.get(SUBSCRIPTIONS_PATH).await)
}

/// `PUT /subscriptions/cancel`
pub async fn cancel(client: &HttpClient) -> Result<ApiEnvelope<Value>> {
    client.put_empty(CANCEL_PATH).await
}

/// `GET /dashboard`
pub async fn developer_console(client: &HttpClient) -> Result<Option<DeveloperConsole>> {
    data_item(client.get(CONSOLE_PATH).await)
}
