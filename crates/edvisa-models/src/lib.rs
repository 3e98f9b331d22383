//! # Edvisa Models
//!
//! Domain models and request/response DTOs.
//!
//! - [`users`]: the [`User`] record, [`UserRole`], and [`NewUser`]
//! - [`auth`]: registration/login/refresh payloads, their validation, and
//!   the token-bearing responses

pub mod auth;
pub mod users;

pub use auth::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, ValidatedLogin,
    ValidatedRegistration, validate_login, validate_registration,
};
pub use users::{NewUser, User, UserRole, normalize_email};
