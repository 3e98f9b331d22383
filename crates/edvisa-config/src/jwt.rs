//! Token signing configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `JWT_ACCESS_SECRET` (or `JWT_SECRET`) | development-only secret |
//! | `JWT_REFRESH_SECRET` | development-only secret |
//! | `JWT_ACCESS_EXPIRY` | `900` (15 minutes) |
//! | `JWT_REFRESH_EXPIRY` | `604800` (7 days) |

use std::env;

use crate::environment::AppEnvironment;
use crate::{ConfigError, env_or};

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";
const MIN_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            access_secret: env::var("JWT_ACCESS_SECRET")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or(defaults.access_secret),
            refresh_secret: env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", defaults.refresh_token_expiry),
        }
    }

    /// Refuses development secrets, short secrets, and a shared
    /// access/refresh secret when running in production.
    pub fn ensure_production_ready(&self, environment: AppEnvironment) -> Result<(), ConfigError> {
        if !environment.is_production() {
            return Ok(());
        }

        if self.access_secret == DEV_ACCESS_SECRET {
            return Err(ConfigError::Missing("JWT_ACCESS_SECRET"));
        }
        if self.refresh_secret == DEV_REFRESH_SECRET {
            return Err(ConfigError::Missing("JWT_REFRESH_SECRET"));
        }
        if self.access_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Weak {
                name: "JWT_ACCESS_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }
        if self.refresh_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Weak {
                name: "JWT_REFRESH_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Weak {
                name: "JWT_REFRESH_SECRET",
                reason: "must differ from the access token secret".to_string(),
            });
        }

        Ok(())
    }
}
