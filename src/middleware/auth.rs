use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use edvisa_auth::{Identity, TokenIssuer};
use edvisa_core::{AppError, UnauthorizedReason};

use crate::state::AppState;

/// Extracts the raw token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers.get(header::AUTHORIZATION).ok_or_else(|| {
        AppError::unauthorized(UnauthorizedReason::MissingToken, "Missing authorization header")
    })?;

    let malformed = || {
        AppError::unauthorized(
            UnauthorizedReason::MalformedHeader,
            "Invalid authorization header format",
        )
    };

    value
        .to_str()
        .map_err(|_| malformed())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(malformed)
}

/// Resolves the caller's identity from request headers.
pub fn identify(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Identity, AppError> {
    let token = bearer_token(headers)?;
    let claims = tokens.verify_access_token(token)?;
    Ok(Identity::try_from(claims)?)
}

/// Layer for routes that need any authenticated caller. Inserts the
/// [`Identity`] into the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identify(req.headers(), &state.tokens)?;
    tracing::debug!(user_id = %identity.id, role = %identity.role, "Authenticated request");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// The authenticated caller. Reuses the identity resolved by an earlier
/// layer, otherwise verifies the bearer token itself.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(AuthUser(identity.clone()));
        }

        identify(&parts.headers, &state.tokens).map(AuthUser)
    }
}
