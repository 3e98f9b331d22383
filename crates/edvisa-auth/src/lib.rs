//! # Edvisa Auth
//!
//! Token issuance and verification.
//!
//! - [`claims`]: access and refresh token claims, and the per-request
//!   [`Identity`] derived from a verified access token
//! - [`jwt`]: [`TokenIssuer`], which signs, verifies and rotates tokens
//! - [`clock`]: the time source verification is evaluated against
//! - [`error`]: [`TokenError`]
//!
//! Access and refresh tokens are HS256 JWTs signed with separate secrets.
//! Verification is stateless: signature, algorithm, token type and expiry
//! are the only inputs.
//!
//! # Example
//!
//! ```ignore
//! use edvisa_auth::TokenIssuer;
//! use edvisa_config::JwtConfig;
//!
//! let issuer = TokenIssuer::new(&JwtConfig::from_env());
//! let tokens = issuer.issue_pair(&user)?;
//! let claims = issuer.verify_access_token(&tokens.access_token)?;
//! assert_eq!(claims.sub, user.id.to_string());
//! ```

pub mod claims;
pub mod clock;
pub mod error;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{AccessClaims, Identity, RefreshClaims, TokenType};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TokenError;
pub use jwt::TokenIssuer;
