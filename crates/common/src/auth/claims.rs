//! Role claims carried inside the bearer token
//!
//! The token is only read, never trusted for access control: the signature
//! is not verified because the client holds no key. The backend remains the
//! authority on every authenticated call.

use crate::models::Role;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;

/// Claim names the backend may use for roles
const ROLE_CLAIMS: &[&str] = &["role", "roles", "authorities"];

/// Role asserted inside a JWT, if the token is a JWT and carries one
pub fn role_from_token(token: &str) -> Option<Role> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let claims = decode::<Value>(token, &DecodingKey::from_secret(b""), &validation)
        .ok()?
        .claims;

    role_from_claims(&claims)
}

/// Interpret `role`, `roles` or `authorities` from a claims object
pub fn role_from_claims(claims: &Value) -> Option<Role> {
    let mut asserted: Vec<String> = Vec::new();

    for name in ROLE_CLAIMS {
        match claims.get(*name) {
            Some(Value::String(role)) => asserted.push(role.clone()),
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(role) => asserted.push(role.clone()),
                        // Spring's `{ "authority": "ROLE_ADMIN" }`
                        Value::Object(obj) => {
                            if let Some(Value::String(role)) = obj.get("authority") {
                                asserted.push(role.clone());
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if asserted.is_empty() {
        return None;
    }

    let role = if asserted.iter().any(|r| Role::from_claim(r).is_admin()) {
        Role::Administrator
    } else {
        Role::Standard
    };
    Some(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(claims: Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn test_role_claim_in_jwt() {
        let jwt = token(json!({"sub": "ops@acme.io", "role": "ROLE_ADMIN", "exp": 1}));
        assert_eq!(role_from_token(&jwt), Some(Role::Administrator));
    }

    #[test]
    fn test_authorities_objects() {
        let jwt = token(json!({"sub": "x", "authorities": [{"authority": "ROLE_USER"}]}));
        assert_eq!(role_from_token(&jwt), Some(Role::Standard));
    }

    #[test]
    fn test_no_claim_or_opaque_token() {
        let jwt = token(json!({"sub": "x"}));
        assert_eq!(role_from_token(&jwt), None);
        assert_eq!(role_from_token("opaque-session-token"), None);
    }

    #[test]
    fn test_any_admin_role_wins() {
        let claims = json!({"roles": ["USER", "ADMIN"]});
        assert_eq!(role_from_claims(&claims), Some(Role::Administrator));
    }
}
