//! Transport abstraction
//!
//! Provides a unified interface for issuing requests:
//! - `ReqwestTransport` for the real backend
//! - `ScriptedTransport` with canned responses, for tests and offline demos

use crate::errors::{ApiError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base address, query included
    pub path: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a received response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Trait for request execution
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request. Only failures to obtain a response are errors;
    /// non-2xx statuses come back as `Ok`.
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new transport; `None` keeps reqwest's default timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ApiError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(|e| ApiError::Network {
            message: format!("Request failed: {}", e),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network {
            message: format!("Failed to read response body: {}", e),
        })?;

        Ok(RawResponse { status, body })
    }
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Result<RawResponse>>,
}

/// Transport answering from a script of canned replies, recording every request
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`. Replies for one route are consumed
    /// in order; the last one is repeated.
    pub fn reply(&self, method: Method, path: &str, reply: Result<RawResponse>) -> &Self {
        let mut routes = lock(&self.routes);
        match routes.iter_mut().find(|r| r.method == method && r.path == path) {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        drop(routes);
        self
    }

    /// Queue a JSON reply
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.reply(method, path, Ok(RawResponse::json(status, body)))
    }

    /// Queue a reply where no response arrives
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.reply(
            method,
            path,
            Err(ApiError::Network {
                message: message.to_string(),
            }),
        )
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn replay(reply: &Result<RawResponse>) -> Result<RawResponse> {
    match reply {
        Ok(response) => Ok(response.clone()),
        Err(ApiError::Network { message }) => Err(ApiError::Network {
            message: message.clone(),
        }),
        Err(other) => Err(ApiError::Network {
            message: other.to_string(),
        }),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let key = (request.method, request.path.clone());
        lock(&self.requests).push(request);

        let mut routes = lock(&self.routes);
        let route = routes
            .iter_mut()
            .find(|r| r.method == key.0 && r.path == key.1)
            .ok_or_else(|| ApiError::Network {
                message: format!("no scripted reply for {} {}", key.0, key.1),
            })?;

        if route.replies.len() > 1 {
            route.replies.pop_front().unwrap_or_else(|| {
                Err(ApiError::Network {
                    message: "script exhausted".to_string(),
                })
            })
        } else {
            route
                .replies
                .front()
                .map(replay)
                .unwrap_or_else(|| {
                    Err(ApiError::Network {
                        message: "script exhausted".to_string(),
                    })
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: Method, path: &str) -> ApiRequest {
        ApiRequest {
            method,
            path: path.to_string(),
            url: format!("http://backend{}", path),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order_then_repeat() {
        let transport = ScriptedTransport::new();
        transport
            .respond(Method::Get, "/public", 500, json!({}))
            .respond(Method::Get, "/public", 200, json!({"data": []}));

        let first = transport.execute(request(Method::Get, "/public")).await.unwrap();
        let second = transport.execute(request(Method::Get, "/public")).await.unwrap();
        let third = transport.execute(request(Method::Get, "/public")).await.unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_route_is_a_network_failure() {
        let transport = ScriptedTransport::new();
        let err = transport
            .execute(request(Method::Delete, "/admin/plan/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request(Method::Get, "/x");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), None);
    }
}
