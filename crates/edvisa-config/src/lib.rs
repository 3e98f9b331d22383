//! # Edvisa Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token secrets and lifetimes
//! - [`environment`]: operating mode (development, test, production)
//! - [`server`]: bind address
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//!
//! Values are read once at startup and injected where they are needed;
//! nothing in this crate is global.
//!
//! # Example
//!
//! ```ignore
//! use edvisa_config::{AppEnvironment, JwtConfig};
//!
//! let environment = AppEnvironment::from_env();
//! let jwt_config = JwtConfig::from_env();
//! jwt_config.ensure_production_ready(environment)?;
//! ```

pub mod cors;
pub mod environment;
pub mod jwt;
pub mod server;

use std::env;
use std::str::FromStr;

use thiserror::Error;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use environment::AppEnvironment;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} is too weak: {reason}")]
    Weak { name: &'static str, reason: String },
}

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset or unparsable.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
