//! Admin plan and user management
//!
//! The backend enforces the administrator role; these calls are simply
//! rejected for anyone else.

use super::data_list;
use crate::errors::Result;
use crate::http::HttpClient;
use crate::models::{AdminUser, ApiEnvelope, CreatePlanRequest, Plan};
use serde_json::Value;

pub const ADMIN_PLAN_PATH: &str = "/admin/plan";
pub const ADMIN_USERS_PATH: &str = "/admin/users";

/// `GET /admin/plan`, inactive plans included
pub async fn list_plans(client: &HttpClient) -> Result<Vec<Plan>> {
    data_list(client.get(ADMIN_PLAN_PATH).await)
}

/// `POST /admin/plan`
pub async fn create_plan(
    client: &HttpClient,
    request: &CreatePlanRequest,
) -> Result<ApiEnvelope<Plan>> {
    client.post(ADMIN_PLAN_PATH, request).await
}

/// `PUT /admin/plan/{id}/activate`
pub async fn activate_plan(client: &HttpClient, id: i64) -> Result<ApiEnvelope<Value>> {
    client
        .put_empty(&format!("{}/{}/activate", ADMIN_PLAN_PATH, id))
        .await
}

/// `PUT /admin/plan/{id}/deactivate`
pub async fn deactivate_plan(client: &HttpClient, id: i64) -> Result<ApiEnvelope<Value>> {
    client
        .put_empty(&format!("{}/{}/deactivate", ADMIN_PLAN_PATH, id))
        .await
}

/// `DELETE /admin/plan/{id}`
pub async fn delete_plan(client: &HttpClient, id: i64) -> Result<ApiEnvelope<Value>> {
    client.delete(&format!("{}/{}", ADMIN_PLAN_PATH, id)).await
}

/// `GET /admin/users`
pub async fn list_users(client: &HttpClient) -> Result<Vec<AdminUser>> {
    data_list(client.get(ADMIN_USERS_PATH).await)
}
