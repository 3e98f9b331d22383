use axum::{
    Json,
    extract::{Path, State},
};
use edvisa_core::{AppError, ErrorEnvelope};
use edvisa_models::User;
use tracing::instrument;
use uuid::Uuid;

use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user(&state, identity.id).await?;
    Ok(Json(user))
}

/// Get a user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Malformed user ID", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user_id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid user ID"))?;
    let user = UserService::get_user(&state, id).await?;
    Ok(Json(user))
}
