use edvisa_core::{AppError, UnauthorizedReason};
use edvisa_db::StoreError;
use thiserror::Error;

use crate::claims::TokenType;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid {kind} token: {reason}")]
    Invalid { kind: TokenType, reason: String },

    #[error("{kind} token has expired")]
    Expired { kind: TokenType },

    #[error("failed to sign {kind} token: {reason}")]
    Encoding { kind: TokenType, reason: String },

    #[error("failed to resolve token subject: {0}")]
    Lookup(#[from] StoreError),
}

impl TokenError {
    pub fn invalid(kind: TokenType, reason: impl Into<String>) -> Self {
        TokenError::Invalid {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid { kind, .. } | TokenError::Expired { kind } => {
                let message = match kind {
                    TokenType::Access => "Invalid or expired token",
                    TokenType::Refresh => "Invalid or expired refresh token",
                };
                AppError::unauthorized(UnauthorizedReason::InvalidToken, message)
            }
            TokenError::Encoding { .. } => AppError::internal(err),
            TokenError::Lookup(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edvisa_core::ErrorKind;

    #[test]
    fn test_expired_and_invalid_share_generic_message() {
        let expired: AppError = TokenError::Expired {
            kind: TokenType::Access,
        }
        .into();
        let invalid: AppError = TokenError::invalid(TokenType::Access, "bad signature").into();

        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(
            expired.kind,
            ErrorKind::Unauthorized(UnauthorizedReason::InvalidToken)
        );
    }

    #[test]
    fn test_refresh_message_names_refresh_token() {
        let error: AppError = TokenError::invalid(TokenType::Refresh, "unknown subject").into();
        assert_eq!(error.to_string(), "Invalid or expired refresh token");
    }

    #[test]
    fn test_encoding_failure_is_internal() {
        let error: AppError = TokenError::Encoding {
            kind: TokenType::Access,
            reason: "boom".to_string(),
        }
        .into();
        assert_eq!(error.kind, ErrorKind::Internal);
    }
}
