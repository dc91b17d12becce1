//! HTTP client contract
//!
//! Two request-issuing clients share the base address and JSON headers:
//! - `authenticated`: attaches the persisted bearer token when one exists
//! - `public`: never attaches a token; used for login and registration
//!
//! Neither client navigates or touches the session on a 401. They return
//! `ApiError::Unauthorized` tagged with their kind and leave the decision
//! to the session controller.

pub mod transport;

pub use transport::{ApiRequest, Method, RawResponse, ReqwestTransport, ScriptedTransport, Transport};

use crate::errors::{ApiError, ClientKind, Result};
use crate::metrics::RequestMetrics;
use crate::models::{ApiEnvelope, ErrorBody};
use crate::session::SessionStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A request-issuing client bound to one base address
#[derive(Clone)]
pub struct HttpClient {
    kind: ClientKind,
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Option<Arc<SessionStore>>,
}

impl HttpClient {
    /// Client that attaches the session's bearer token
    pub fn authenticated(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            kind: ClientKind::Authenticated,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session: Some(session),
        }
    }

    /// Client without credentials
    pub fn public(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            kind: ClientKind::Public,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session: None,
        }
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        self.send(Method::Get, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::Post, path, Some(body)).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        self.send(Method::Post, path, None).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::Put, path, Some(body)).await
    }

    /// PUT without a request body
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        self.send(Method::Put, path, None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>> {
        self.send(Method::Delete, path, None).await
    }

    fn prepare(&self, method: Method, path: &str, body: Option<Value>) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];

        if let Some(token) = self.session.as_ref().and_then(|s| s.token()) {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        ApiRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiEnvelope<T>> {
        let request = self.prepare(method, path, body);
        let metrics = RequestMetrics::start(self.kind.as_str(), method.as_str());

        debug!(
            client = self.kind.as_str(),
            method = %method,
            path = %path,
            bearer = request.header("Authorization").is_some(),
            "Sending request"
        );

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                metrics.finish(None);
                warn!(client = self.kind.as_str(), method = %method, path = %path, error = %e, "Request failed");
                return Err(e);
            }
        };
        metrics.finish(Some(response.status));

        self.interpret(method, path, response)
    }

    fn interpret<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        response: RawResponse,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status;

        if (200..300).contains(&status) {
            if response.body.trim().is_empty() {
                return Ok(ApiEnvelope {
                    message: None,
                    data: None,
                    status: Some(status),
                    timestamp: None,
                });
            }
            return serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
                message: format!("{} {}: {}", method, path, e),
            });
        }

        // error bodies are best-effort; plain-text bodies carry no fields
        let error_body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
        warn!(
            client = self.kind.as_str(),
            method = %method,
            path = %path,
            status,
            message = error_body.message.as_deref().unwrap_or(""),
            "Request rejected"
        );

        if status == 401 {
            return Err(ApiError::Unauthorized {
                client: self.kind,
                message: error_body.message,
            });
        }

        Err(ApiError::Status {
            status,
            message: error_body.message,
            error: error_body.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use crate::session::Session;
    use serde_json::json;

    const BASE: &str = "https://backend.test/api";

    fn signed_in_store() -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::in_memory());
        store
            .set(Session {
                access_token: "jwt-abc".into(),
                user: User {
                    email: "a@b.io".into(),
                    role: Role::Standard,
                },
            })
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_authenticated_client_attaches_bearer() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Get, "/subscriptions", 200, json!({"data": null}));
        let client = HttpClient::authenticated(BASE, transport.clone(), signed_in_store());

        let _: ApiEnvelope<Value> = client.get("/subscriptions").await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://backend.test/api/subscriptions");
        assert_eq!(sent.header("Authorization"), Some("Bearer jwt-abc"));
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_token_means_no_authorization_header() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Get, "/subscriptions", 200, json!({}));
        let store = Arc::new(SessionStore::in_memory());
        let client = HttpClient::authenticated(BASE, transport.clone(), store);

        let _: ApiEnvelope<Value> = client.get("/subscriptions").await.unwrap();
        assert_eq!(transport.requests()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_public_client_never_attaches_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Get, "/public", 200, json!({"data": []}));
        let client = HttpClient::public(BASE, transport.clone());
        // a session exists, but the public client has no access to it
        let _store = signed_in_store();

        let _: ApiEnvelope<Vec<Value>> = client.get("/public").await.unwrap();
        assert_eq!(transport.requests()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_unauthorized_is_tagged_with_client_kind() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(Method::Get, "/subscriptions", 401, json!({"message": "Token expired"}))
            .respond(Method::Post, "/auth/log", 401, json!({"message": "Bad credentials"}));

        let auth = HttpClient::authenticated(BASE, transport.clone(), signed_in_store());
        let public = HttpClient::public(BASE, transport.clone());

        let err = auth.get::<Value>("/subscriptions").await.unwrap_err();
        assert!(err.is_session_expiry());
        assert_eq!(err.server_message(), Some("Token expired"));

        let err = public
            .post::<_, Value>("/auth/log", &json!({"email": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { client: ClientKind::Public, .. }));
        assert!(!err.is_session_expiry());
    }

    #[tokio::test]
    async fn test_error_statuses_carry_server_fields() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            "/auth/reg",
            500,
            json!({"error": "Internal Server Error", "message": "Duplicate entry 'a@b.io'"}),
        );
        let client = HttpClient::public(BASE, transport);

        let err = client
            .post::<_, Value>("/auth/reg", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.server_message(), Some("Duplicate entry 'a@b.io'"));
        assert_eq!(err.server_error(), Some("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            Method::Get,
            "/public",
            Ok(RawResponse {
                status: 503,
                body: "upstream unavailable".into(),
            }),
        );
        let client = HttpClient::public(BASE, transport);

        let err = client.get::<Value>("/public").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(Method::Put, "/subscriptions/cancel", "connection refused");
        let client = HttpClient::authenticated(BASE, transport, signed_in_store());

        let err = client.put_empty::<Value>("/subscriptions/cancel").await.unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            Method::Get,
            "/public",
            Ok(RawResponse {
                status: 200,
                body: "<html>".into(),
            }),
        );
        let client = HttpClient::public(BASE, transport);

        let err = client.get::<Value>("/public").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
