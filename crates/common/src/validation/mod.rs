//! Client-side form validation
//!
//! Forms are checked before any request is issued. Each field reports one
//! message: the first rule it breaks.

use crate::models::{LoginRequest, RegisterRequest};
use regex_lite::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use validator::{Validate, ValidationError, ValidationErrors};

/// Characters accepted as the "special" password character
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";
pub const PASSWORD_MIN_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Required, then shaped like `local@domain.tld`
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(failure("required", "Email is required"));
    }
    if !email_regex().is_match(email) {
        return Err(failure("email", "Enter a valid email address"));
    }
    Ok(())
}

/// Registration password rules, checked in order
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(failure("required", "Password is required"));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(failure("length", "Must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(failure("uppercase", "Must include at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(failure("lowercase", "Must include at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(failure("digit", "Must include at least one number"));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(failure(
            "special",
            "Must include at least one special character (@$!%*?&)",
        ));
    }
    Ok(())
}

/// Amounts and prices; `inf` and `NaN` parse as `f64` but have no JSON form
pub fn validate_finite<T: std::borrow::Borrow<f64>>(value: T) -> Result<(), ValidationError> {
    if !value.borrow().is_finite() {
        return Err(failure("finite", "Must be a finite number"));
    }
    Ok(())
}

fn validate_required_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(failure("required", "Password is required"));
    }
    Ok(())
}

/// Field name to its first message
pub type FieldErrors = BTreeMap<String, String>;

/// Collapse validator output to one message per field
pub fn first_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            Some((field.to_string(), message))
        })
        .collect()
}

/// Validate a derive-annotated request, reporting the first message per field
pub fn check<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(|e| first_messages(&e))
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_email"))]
    pub email: String,

    #[validate(custom(function = "validate_required_password"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(self) -> Result<LoginRequest, FieldErrors> {
        let form = LoginForm {
            email: self.email.trim().to_string(),
            password: self.password,
        };
        check(&form)?;
        Ok(LoginRequest {
            email: form.email,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub tenant_name: String,

    #[validate(length(min = 1, message = "Your name is required"))]
    pub user_name: String,

    #[validate(custom(function = "validate_email"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    /// Only checked when given
    pub confirm_password: Option<String>,
}

impl RegisterForm {
    /// Validate and build the registration body
    pub fn check(self) -> Result<RegisterRequest, FieldErrors> {
        let request = RegisterRequest {
            tenant_name: self.tenant_name,
            user_name: self.user_name,
            email: self.email,
            password: self.password,
        }
        .normalized();

        let form = RegisterForm {
            tenant_name: request.tenant_name.clone(),
            user_name: request.user_name.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            confirm_password: self.confirm_password,
        };

        let mut errors = match form.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => first_messages(&e),
        };

        if let Some(confirm) = &form.confirm_password {
            if *confirm != form.password {
                errors.insert("confirm_password".to_string(), "Passwords do not match".to_string());
            }
        }

        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors)
        }
    }
}
