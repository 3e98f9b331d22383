//! Application error type and the uniform error envelope.
//!
//! Every failure on the request path is an [`AppError`]. Its [`ErrorKind`]
//! decides the HTTP status once, in [`ErrorKind::status`], and the error is
//! rendered as an [`ErrorEnvelope`]:
//!
//! ```json
//! {
//!   "success": false,
//!   "status_code": 401,
//!   "status": "fail",
//!   "code": "token_missing",
//!   "message": "Missing authorization header"
//! }
//! ```
//!
//! The body produced by [`IntoResponse`] is always the production-safe
//! rendering. The full report (real internal message plus the error chain as
//! `stack`) travels in the response extensions as an [`ErrorReport`] so the
//! server's error normalization layer can expose it outside production.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Field name to the list of messages describing what is wrong with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Why a request was not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnauthorizedReason {
    /// No `Authorization` header (or refresh token) was supplied.
    MissingToken,
    /// The header was present but not of the form `Bearer <token>`.
    MalformedHeader,
    /// The token failed signature, structure, type or expiry checks.
    InvalidToken,
}

/// The category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A payload violated field constraints.
    Validation,
    /// The request body could not be read at all.
    BadRequest,
    /// A unique field is already taken.
    Conflict,
    /// Login credentials did not match.
    Authentication,
    /// Missing, malformed, invalid or expired token.
    Unauthorized(UnauthorizedReason),
    /// Authenticated but the role is not permitted.
    Forbidden,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Maps every kind to its HTTP status.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the envelope.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_failed",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Authentication => "invalid_credentials",
            ErrorKind::Unauthorized(UnauthorizedReason::MissingToken) => "token_missing",
            ErrorKind::Unauthorized(UnauthorizedReason::MalformedHeader) => "token_malformed",
            ErrorKind::Unauthorized(UnauthorizedReason::InvalidToken) => "token_invalid",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal_error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
    pub fields: Option<FieldErrors>,
}

impl AppError {
    pub fn from_kind<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
            fields: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::from_kind(ErrorKind::Internal, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow!(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::NotFound, anyhow!(message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::BadRequest, anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Conflict, anyhow!(message.into()))
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Authentication, anyhow!(message.into()))
    }

    pub fn unauthorized(reason: UnauthorizedReason, message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Unauthorized(reason), anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Forbidden, anyhow!(message.into()))
    }

    /// A validation failure with per-field messages. The summary message
    /// joins every field message.
    pub fn validation(fields: FieldErrors) -> Self {
        let summary = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            kind: ErrorKind::Validation,
            error: anyhow!(summary),
            fields: Some(fields),
        }
    }

    /// A validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.into()]);
        Self::validation(fields)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// The full rendering, including the real message and the error chain.
    /// Unauthorized errors never carry a stack.
    pub fn report(&self) -> ErrorEnvelope {
        let status = self.status();
        let stack = match self.kind {
            ErrorKind::Unauthorized(_) => None,
            _ => Some(format!("{:?}", self.error)),
        };
        ErrorEnvelope {
            success: false,
            status_code: status.as_u16(),
            status: status_label(status).to_string(),
            code: self.kind.code().to_string(),
            message: self.error.to_string(),
            fields: self.fields.clone(),
            stack,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// `"fail"` for caller faults, `"error"` for server faults.
pub fn status_label(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else {
        "fail"
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorEnvelope {
    /// Strips diagnostics and masks server-side messages.
    pub fn redacted(&self) -> Self {
        let message = if self.status_code >= 500 {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.message.clone()
        };

        Self {
            message,
            stack: None,
            ..self.clone()
        }
    }
}

/// Full error report attached to the response extensions.
#[derive(Debug, Clone)]
pub struct ErrorReport(pub ErrorEnvelope);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let report = self.report();

        if status.is_server_error() {
            tracing::error!(error = ?self.error, code = %report.code, "Request failed");
        }

        let mut response = (status, Json(report.redacted())).into_response();
        response.extensions_mut().insert(ErrorReport(report));
        response
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(field_errors(&errors))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::internal(anyhow!("Password hashing failed: {}", err))
    }
}

/// Flattens `validator` output into a field map, falling back to
/// `"<field> is invalid"` when a rule carries no message.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorEnvelope {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_kind_status_table() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorKind::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_reasons_share_status_but_not_code() {
        let missing = ErrorKind::Unauthorized(UnauthorizedReason::MissingToken);
        let malformed = ErrorKind::Unauthorized(UnauthorizedReason::MalformedHeader);
        let invalid = ErrorKind::Unauthorized(UnauthorizedReason::InvalidToken);

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        assert_ne!(missing.code(), malformed.code());
        assert_ne!(missing.code(), invalid.code());
        assert_ne!(missing.code(), ErrorKind::Forbidden.code());
    }

    #[test]
    fn test_unrecognized_errors_default_to_internal() {
        let error: AppError = anyhow!("disk on fire").into();
        assert_eq!(error.kind, ErrorKind::Internal);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_summary_joins_field_messages() {
        let mut fields = FieldErrors::new();
        fields.insert("email".into(), vec!["Email must be valid".into()]);
        fields.insert("name".into(), vec!["Name is required".into()]);

        let error = AppError::validation(fields);
        assert_eq!(error.to_string(), "Email must be valid, Name is required");
        assert_eq!(error.fields.as_ref().map(|f| f.len()), Some(2));
    }

    #[tokio::test]
    async fn test_unauthorized_response_keeps_message() {
        let response =
            AppError::unauthorized(UnauthorizedReason::MissingToken, "Missing authorization header")
                .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let report = response.extensions().get::<ErrorReport>().cloned().unwrap();
        assert_eq!(report.0.message, "Missing authorization header");
        assert!(report.0.stack.is_none());

        let body = body_of(response).await;
        assert!(!body.success);
        assert_eq!(body.status, "fail");
        assert_eq!(body.code, "token_missing");
        assert_eq!(body.message, "Missing authorization header");
        assert!(body.stack.is_none());
        assert!(body.fields.is_none());
    }

    #[tokio::test]
    async fn test_internal_response_is_masked() {
        let response = AppError::internal_error("connection refused on 10.0.0.3").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let report = response.extensions().get::<ErrorReport>().cloned().unwrap();
        assert_eq!(report.0.message, "connection refused on 10.0.0.3");
        assert!(report.0.stack.is_some());

        let body = body_of(response).await;
        assert_eq!(body.status, "error");
        assert_eq!(body.message, "Internal server error");
        assert!(body.stack.is_none());
    }
}
