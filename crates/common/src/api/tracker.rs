//! Personal subscription tracking

use super::{data_item, data_list};
use crate::errors::Result;
use crate::http::HttpClient;
use crate::models::{
    ApiEnvelope, Category, Insight, SubscriptionStats, TrackedSubscription,
    TrackedSubscriptionRequest,
};
use serde_json::Value;

pub const TRACKER_PATH: &str = "/user-Subscriptions";
pub const CATEGORIES_PATH: &str = "/categories";

/// Renewal window used when the caller has no preference
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

/// `POST /user-Subscriptions`
pub async fn create(
    client: &HttpClient,
    request: &TrackedSubscriptionRequest,
) -> Result<ApiEnvelope<TrackedSubscription>> {
    client.post(TRACKER_PATH, request).await
}

/// `GET /user-Subscriptions`
pub async fn list(client: &HttpClient) -> Result<Vec<TrackedSubscription>> {
    data_list(client.get(TRACKER_PATH).await)
}

/// `GET /user-Subscriptions/active`
pub async fn list_active(client: &HttpClient) -> Result<Vec<TrackedSubscription>> {
    data_list(client.get(&format!("{}/active", TRACKER_PATH)).await)
}

/// `GET /user-Subscriptions/category/{id}`
pub async fn list_by_category(
    client: &HttpClient,
    category_id: i64,
) -> Result<Vec<TrackedSubscription>> {
    data_list(
        client
            .get(&format!("{}/category/{}", TRACKER_PATH, category_id))
            .await,
    )
}

/// `PUT /user-Subscriptions/update/{id}`
pub async fn update(
    client: &HttpClient,
    id: i64,
    request: &TrackedSubscriptionRequest,
) -> Result<ApiEnvelope<TrackedSubscription>> {
    client
        .put(&format!("{}/update/{}", TRACKER_PATH, id), request)
        .await
}

/// `PUT /user-Subscriptions/cancel/{id}`
pub async fn cancel(client: &HttpClient, id: i64) -> Result<ApiEnvelope<Value>> {
    client
        .put_empty(&format!("{}/cancel/{}", TRACKER_PATH, id))
        .await
}

/// `GET /user-Subscriptions/upcoming?days={days}`
pub async fn upcoming(client: &HttpClient, days: u32) -> Result<Vec<TrackedSubscription>> {
    data_list(
        client
            .get(&format!("{}/upcoming?days={}", TRACKER_PATH, days))
            .await,
    )
}

/// `GET /user-Subscriptions/stats`
pub async fn stats(client: &HttpClient) -> Result<Option<SubscriptionStats>> {
    data_item(client.get(&format!("{}/stats", TRACKER_PATH)).await)
}

/// `GET /user-Subscriptions/insights`
pub async fn insights(client: &HttpClient) -> Result<Vec<Insight>> {
    data_list(client.get(&format!("{}/insights", TRACKER_PATH)).await)
}

/// `GET /categories`
pub async fn categories(client: &HttpClient) -> Result<Vec<Category>> {
    data_list(client.get(CATEGORIES_PATH).await)
}
