use edvisa_core::AppError;
use edvisa_models::User;
use uuid::Uuid;

use crate::state::AppState;

pub struct UserService;

impl UserService {
    pub async fn get_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
        state
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
