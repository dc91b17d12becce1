//! Resource access modules
//!
//! One function per backend call. No caching and no retries; a 401 on the
//! authenticated client surfaces as `ApiError::Unauthorized` for the
//! session controller to handle.

pub mod admin;
pub mod overview;
pub mod plans;
pub mod subscriptions;
pub mod tracker;

use crate::errors::Result;
use crate::models::ApiEnvelope;

/// Unwrap a list payload; a missing `data` is an empty list
fn data_list<T>(envelope: Result<ApiEnvelope<Vec<T>>>) -> Result<Vec<T>> {
    Ok(envelope?.into_data().unwrap_or_default())
}

/// Unwrap an optional payload
fn data_item<T>(envelope: Result<ApiEnvelope<T>>) -> Result<Option<T>> {
    Ok(envelope?.into_data())
}
