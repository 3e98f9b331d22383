//! # Edvisa Core
//!
//! Core types shared by every Edvisa crate.
//!
//! - [`errors`]: the application error type, its kind table, and the JSON
//!   envelope every failure is rendered as
//! - [`password`]: bcrypt password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use edvisa_core::errors::{AppError, ErrorKind};
//! use edvisa_core::password::{hash_password, verify_password};
//!
//! let error = AppError::forbidden("Administrator privileges required");
//! assert_eq!(error.kind, ErrorKind::Forbidden);
//!
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash)?);
//! ```

pub mod errors;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorEnvelope, ErrorKind, ErrorReport, FieldErrors, UnauthorizedReason};
pub use password::{hash_password, verify_password};
