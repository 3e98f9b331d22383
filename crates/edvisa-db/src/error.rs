use edvisa_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt user record: {0}")]
    Corrupt(String),

    #[error("credential check failed: {0}")]
    Credentials(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => AppError::conflict(err.to_string()),
            other => AppError::internal(other),
        }
    }
}
