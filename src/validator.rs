//! JSON body extractors that fail with [`AppError`] envelopes.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use edvisa_core::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

fn missing_field(message: &str) -> Option<&str> {
    message
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();

    if let Some(field) = missing_field(&message) {
        return AppError::invalid_field(field, format!("{} is required", field));
    }

    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Missing 'Content-Type: application/json' header")
        }
        JsonRejection::JsonDataError(_) => AppError::bad_request("Invalid field type in request"),
        _ => AppError::bad_request("Invalid request body"),
    }
}

/// Deserializes a JSON body without running field validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        Ok(JsonBody(value))
    }
}

/// Deserializes a JSON body and validates it as a unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
