//! Request middleware and extractors.
//!
//! - [`auth`]: bearer-token authentication and the [`auth::AuthUser`] extractor
//! - [`role`]: role gates layered on top of authentication
//! - [`errors`]: final rendering of error envelopes per operating mode
//!
//! # Authorization flow
//!
//! 1. No `Authorization` header: 401 `token_missing`
//! 2. Header not of the form `Bearer <token>`: 401 `token_malformed`
//! 3. Token fails verification: 401 `token_invalid`
//! 4. Role not allowed: 403 `forbidden`
//!
//! Any rejection stops the request before it reaches the handler.
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::RequireAdmin;
//!
//! // Any valid access token
//! async fn me(AuthUser(identity): AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! // Admins only
//! async fn audit(RequireAdmin(identity): RequireAdmin) -> impl IntoResponse { /* ... */ }
//! ```

pub mod auth;
pub mod errors;
pub mod role;
