//! Signing, verification and rotation of access and refresh tokens.
//!
//! [`TokenIssuer`] is built once from a [`JwtConfig`] and a [`Clock`] and
//! shared behind an `Arc`. It holds no mutable state, so concurrent
//! verifications never contend.
//!
//! Verification pins the algorithm to HS256. A token whose header names any
//! other algorithm, including `none`, is rejected before its signature is
//! looked at. Expiry is evaluated against the injected clock: a token is
//! expired once `now >= exp`.

use std::fmt;
use std::sync::Arc;

use edvisa_config::JwtConfig;
use edvisa_db::UserRepository;
use edvisa_models::{AuthResponse, TokenPair, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use uuid::Uuid;

use crate::claims::{AccessClaims, RefreshClaims, TokenType};
use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;

const ALGORITHM: Algorithm = Algorithm::HS256;

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: i64,
}

impl SigningKeys {
    fn new(secret: &str, ttl: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against `clock` in `decode_checked`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: SigningKeys::new(&config.access_secret, config.access_token_expiry),
            refresh: SigningKeys::new(&config.refresh_secret, config.refresh_token_expiry),
            validation,
            clock,
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.access.ttl
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.refresh.ttl
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = AccessClaims {
            sub: user.id.to_string(),
            role: user.role,
            email: Some(user.email.clone()),
            typ: TokenType::Access,
            iat: now,
            exp: now + self.access.ttl,
        };

        sign(&claims, &self.access.encoding, TokenType::Access)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = RefreshClaims {
            sub: user.id.to_string(),
            typ: TokenType::Refresh,
            iat: now,
            exp: now + self.refresh.ttl,
            jti: Uuid::new_v4().to_string(),
        };

        sign(&claims, &self.refresh.encoding, TokenType::Refresh)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims =
            self.decode_checked(token, &self.access.decoding, TokenType::Access)?;
        self.check_claims(TokenType::Access, claims.typ, claims.exp)?;
        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims =
            self.decode_checked(token, &self.refresh.decoding, TokenType::Refresh)?;
        self.check_claims(TokenType::Refresh, claims.typ, claims.exp)?;
        Ok(claims)
    }

    /// Exchanges a refresh token for a new access/refresh pair.
    ///
    /// The presented token is only verified, never recorded; the caller is
    /// expected to discard it and keep the returned one. A subject that no
    /// longer exists fails exactly like a bad signature.
    #[instrument(skip_all)]
    pub async fn rotate_refresh_token(
        &self,
        refresh_token: &str,
        users: &dyn UserRepository,
    ) -> Result<AuthResponse, TokenError> {
        let claims = self.verify_refresh_token(refresh_token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| TokenError::invalid(TokenType::Refresh, "subject is not a user id"))?;

        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| TokenError::invalid(TokenType::Refresh, "subject no longer exists"))?;

        let tokens = self.issue_pair(&user)?;
        Ok(AuthResponse { user, tokens })
    }

    fn decode_checked<T: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
        kind: TokenType,
    ) -> Result<T, TokenError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::invalid(kind, e.to_string()))
    }

    fn check_claims(&self, expected: TokenType, actual: TokenType, exp: i64) -> Result<(), TokenError> {
        if actual != expected {
            return Err(TokenError::invalid(
                expected,
                format!("expected {} token, got {}", expected, actual),
            ));
        }
        if self.clock.now() >= exp {
            return Err(TokenError::Expired { kind: expected });
        }
        Ok(())
    }
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey, kind: TokenType) -> Result<String, TokenError> {
    encode(&Header::new(ALGORITHM), claims, key).map_err(|e| TokenError::Encoding {
        kind,
        reason: e.to_string(),
    })
}
