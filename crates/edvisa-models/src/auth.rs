//! Authentication payloads and their validation.
//!
//! Registration and login payloads are validated as a unit: any violation
//! rejects the whole payload with a field-level [`AppError::validation`].
//! Validation has no side effects; hashing and persistence happen later.

use std::borrow::Cow;
use std::fmt;

use edvisa_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::users::{User, UserRole, normalize_email};

pub const MIN_PASSWORD_LENGTH: u64 = 6;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Name is required")));
    }
    Ok(())
}

/// Checks the address as it will be stored, so surrounding whitespace is
/// tolerated.
fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if !normalize_email(value).validate_email() {
        return Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("Email must be a valid email address")));
    }
    Ok(())
}

fn validate_role(value: &str) -> Result<(), ValidationError> {
    value.parse::<UserRole>().map(|_| ()).map_err(|_| {
        ValidationError::new("role")
            .with_message(Cow::Borrowed("Role must be either admin or student"))
    })
}

/// Registration payload: `{ name, email, password, role? }`.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// `admin` or `student`; defaults to `student`.
    #[validate(custom(function = "validate_role"))]
    #[serde(default)]
    pub role: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Login payload: `{ email, password }`.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Refresh payload: `{ refresh_token }`. An absent token deserializes as
/// empty and is rejected as a missing token, not a validation failure.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest").finish_non_exhaustive()
    }
}

/// A registration payload that passed validation, with normalized fields.
#[derive(Clone)]
pub struct ValidatedRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// A login payload that passed validation, with a normalized email.
#[derive(Clone)]
pub struct ValidatedLogin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for ValidatedRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedRegistration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ValidatedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedLogin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub fn validate_registration(payload: &RegisterRequest) -> Result<ValidatedRegistration, AppError> {
    payload.validate()?;

    let role = match payload.role.as_deref() {
        Some(role) => role
            .parse()
            .map_err(|_| AppError::invalid_field("role", "Role must be either admin or student"))?,
        None => UserRole::default(),
    };

    Ok(ValidatedRegistration {
        name: payload.name.trim().to_string(),
        email: normalize_email(&payload.email),
        password: payload.password.clone(),
        role,
    })
}

pub fn validate_login(payload: &LoginRequest) -> Result<ValidatedLogin, AppError> {
    payload.validate()?;

    Ok(ValidatedLogin {
        email: normalize_email(&payload.email),
        password: payload.password.clone(),
    })
}

/// An access/refresh token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Response of register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;
    use edvisa_core::ErrorKind;

    fn register(name: &str, email: &str, password: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_registration_defaults_to_student() {
        let valid = validate_registration(&register("Ada", "Ada@Example.com", "secret1", None))
            .unwrap();
        assert_eq!(valid.role, UserRole::Student);
        assert_eq!(valid.email, "ada@example.com");
        assert_eq!(valid.name, "Ada");
    }

    #[test]
    fn test_registration_accepts_admin_role() {
        let valid =
            validate_registration(&register("Root", "root@example.com", "secret1", Some("admin")))
                .unwrap();
        assert_eq!(valid.role, UserRole::Admin);
    }

    #[test]
    fn test_registration_rejects_unknown_role() {
        let err =
            validate_registration(&register("Ada", "ada@example.com", "secret1", Some("teacher")))
                .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let fields = err.fields.unwrap();
        assert_eq!(fields["role"], vec!["Role must be either admin or student"]);
    }

    #[test]
    fn test_registration_rejects_short_password() {
        let err = validate_registration(&register("Ada", "ada@example.com", "12345", None))
            .unwrap_err();
        let fields = err.fields.unwrap();
        assert_eq!(fields["password"], vec!["Password must be at least 6 characters"]);
    }

    #[test]
    fn test_registration_password_of_exactly_six_passes() {
        assert!(validate_registration(&register("Ada", "ada@example.com", "123456", None)).is_ok());
    }

    #[test]
    fn test_registration_rejects_blank_name() {
        let err = validate_registration(&register("   ", "ada@example.com", "secret1", None))
            .unwrap_err();
        assert_eq!(err.fields.unwrap()["name"], vec!["Name is required"]);
    }

    #[test]
    fn test_registration_reports_every_violation_together() {
        let err = validate_registration(&register("", "not-an-email", "1", Some("root")))
            .unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("role"));
    }

    #[test]
    fn test_login_validation() {
        let ok = validate_login(&LoginRequest {
            email: " A@X.com".to_string(),
            password: "x".to_string(),
        })
        .unwrap();
        assert_eq!(ok.email, "a@x.com");

        let err = validate_login(&LoginRequest {
            email: "a@x.com".to_string(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(err.fields.unwrap()["password"], vec!["Password is required"]);

        let err = validate_login(&LoginRequest {
            email: "nope".to_string(),
            password: "x".to_string(),
        })
        .unwrap_err();
        assert!(err.fields.unwrap().contains_key("email"));
    }

    #[test]
    fn test_padded_mixed_case_email_is_accepted_and_normalized() {
        let valid =
            validate_registration(&register("Ada", "  Ada@Example.COM ", "secret1", None)).unwrap();
        assert_eq!(valid.email, "ada@example.com");

        let err = validate_registration(&register("Ada", "   ", "secret1", None)).unwrap_err();
        assert_eq!(
            err.fields.unwrap()["email"],
            vec!["Email must be a valid email address"]
        );
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let request = register("Ada", "ada@example.com", "topsecret", None);
        assert!(!format!("{:?}", request).contains("topsecret"));

        let valid = validate_registration(&request).unwrap();
        assert!(!format!("{:?}", valid).contains("topsecret"));

        let login = validate_login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "topsecret".to_string(),
        })
        .unwrap();
        assert!(!format!("{:?}", login).contains("topsecret"));

        let refresh = RefreshRequest {
            refresh_token: "eyJhbGciOi.secret".to_string(),
        };
        assert!(!format!("{:?}", refresh).contains("secret"));
    }

    #[test]
    fn test_auth_response_flattens_tokens() {
        let json = serde_json::json!({
            "user": {
                "id": "00000000-0000-0000-0000-000000000001",
                "name": "Ada",
                "email": "ada@example.com",
                "role": "admin",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            },
            "access_token": "a",
            "refresh_token": "r"
        });
        let response: AuthResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.tokens.access_token, "a");
        assert_eq!(response.tokens.refresh_token, "r");
        assert_eq!(response.user.role, UserRole::Admin);
    }
}
