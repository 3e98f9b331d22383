//! Role-based authorization.
//!
//! Two ways to gate a route:
//! 1. Layer: [`require_admin`] (or [`require_roles`]) with
//!    `middleware::from_fn_with_state`
//! 2. Extractor: [`RequireAdmin`] in the handler signature

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use edvisa_auth::Identity;
use edvisa_core::AppError;
use edvisa_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Authenticates the request and checks the caller's role against
/// `allowed_roles`.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/reports", get(reports))
///     .layer(middleware::from_fn_with_state(state.clone(), |state, req, next| {
///         require_roles(state, req, next, &[UserRole::Admin])
///     }));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthUser(identity) = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&identity, allowed_roles)?;

    parts.extensions.insert(identity);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Layer for admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub fn check_role(identity: &Identity, role: UserRole) -> Result<(), AppError> {
    check_any_role(identity, &[role])
}

pub fn check_any_role(identity: &Identity, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if identity.has_any_role(allowed_roles) {
        return Ok(());
    }

    tracing::debug!(
        user_id = %identity.id,
        role = %identity.role,
        "Role not permitted for route"
    );

    let required = allowed_roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(AppError::forbidden(format!(
        "Access denied. Required role: {}",
        required
    )))
}

/// Extractor for handlers that only admins may call.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        check_role(&identity, UserRole::Admin)?;
        Ok(RequireAdmin(identity))
    }
}
