use edvisa_core::{AppError, UnauthorizedReason, hash_password};
use edvisa_models::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, validate_login, validate_registration,
};
use tracing::{info, instrument, warn};

use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Validates, hashes, stores, and signs in a new user.
    ///
    /// The up-front email check only gives an early answer; the store's own
    /// uniqueness check decides races.
    #[instrument(skip_all)]
    pub async fn register(state: &AppState, dto: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let registration = validate_registration(dto)?;

        if state.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&registration.password)?;

        let user = state
            .users
            .create(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: registration.role,
            })
            .await?;

        let tokens = state.tokens.issue_pair(&user)?;
        info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(AuthResponse { user, tokens })
    }

    #[instrument(skip_all)]
    pub async fn login(state: &AppState, dto: &LoginRequest) -> Result<AuthResponse, AppError> {
        let credentials = validate_login(dto)?;

        let Some(user) = state
            .users
            .verify_credentials(&credentials.email, &credentials.password)
            .await?
        else {
            warn!("Login failed");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        let tokens = state.tokens.issue_pair(&user)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse { user, tokens })
    }

    /// Exchanges a refresh token for a new pair. The presented token is not
    /// recorded anywhere.
    #[instrument(skip_all)]
    pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<AuthResponse, AppError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AppError::unauthorized(
                UnauthorizedReason::MissingToken,
                "Refresh token is required",
            ));
        }

        let response = state
            .tokens
            .rotate_refresh_token(refresh_token, state.users.as_ref())
            .await?;

        info!(user_id = %response.user.id, "Refresh token rotated");
        Ok(response)
    }
}
