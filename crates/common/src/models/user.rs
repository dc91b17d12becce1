//! Account payloads: credentials, the persisted user record, admin listings

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// UI label for the signed-in account. Access control stays with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "USER")]
    Standard,
    #[serde(rename = "ADMIN")]
    Administrator,
}

impl Role {
    /// Interpret a role claim asserted by the server
    pub fn from_claim(claim: &str) -> Self {
        let claim = claim.trim().to_uppercase();
        let claim = claim.strip_prefix("ROLE_").unwrap_or(&claim);
        match claim {
            "ADMIN" | "ADMINISTRATOR" => Role::Administrator,
            _ => Role::Standard,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Standard => "USER",
            Role::Administrator => "ADMIN",
        })
    }
}

/// Persisted user record `{ email, role }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: Role,
}

/// Body of `POST /auth/log`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `data` of a successful login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /auth/reg`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub tenant_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Trim free-text fields; the password is sent as typed
    pub fn normalized(mut self) -> Self {
        self.tenant_name = self.tenant_name.trim().to_string();
        self.user_name = self.user_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Row of `GET /admin/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default, alias = "userName", alias = "username")]
    pub name: Option<String>,

    pub email: String,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub subscription: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_user_format() {
        let user = User {
            email: "ops@acme.io".into(),
            role: Role::Administrator,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"email":"ops@acme.io","role":"ADMIN"}"#);
        assert_eq!(serde_json::from_str::<User>(&json).unwrap(), user);
    }

    #[test]
    fn test_role_claims() {
        assert_eq!(Role::from_claim("ROLE_ADMIN"), Role::Administrator);
        assert_eq!(Role::from_claim("admin"), Role::Administrator);
        assert_eq!(Role::from_claim("ROLE_USER"), Role::Standard);
        assert_eq!(Role::from_claim("tenant"), Role::Standard);
    }

    #[test]
    fn test_register_request_wire_format() {
        let request = RegisterRequest {
            tenant_name: "  Acme ".into(),
            user_name: " Jo ".into(),
            email: " jo@acme.io ".into(),
            password: " Secret1! ".into(),
        }
        .normalized();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tenantName"], "Acme");
        assert_eq!(json["userName"], "Jo");
        assert_eq!(json["email"], "jo@acme.io");
        assert_eq!(json["password"], " Secret1! ");
    }

    #[test]
    fn test_admin_user_aliases() {
        let user: AdminUser =
            serde_json::from_str(r#"{"id": 1, "userName": "Jo", "email": "jo@acme.io"}"#).unwrap();
        assert_eq!(user.name.as_deref(), Some("Jo"));
        assert!(user.subscription.is_none());
    }
}
