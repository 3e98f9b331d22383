//! Last stop for every error response.
//!
//! [`edvisa_core::AppError`] always renders the production-safe envelope and
//! attaches the full [`ErrorReport`]. Outside production this layer swaps the
//! body for the full report so the `stack` reaches the caller.

use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use edvisa_config::AppEnvironment;
use edvisa_core::{AppError, ErrorReport};
use tracing::{error, warn};

pub async fn normalize_errors(
    State(environment): State<AppEnvironment>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    let Some(ErrorReport(report)) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    if !environment.exposes_error_details() {
        return response;
    }

    match serde_json::to_vec(&report) {
        Ok(bytes) => {
            response.headers_mut().remove(header::CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => warn!(error = %e, "Failed to render detailed error report"),
    }

    response
}

/// Renders a handler panic as an internal error envelope.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Handler panicked");
    AppError::internal_error(format!("Handler panicked: {}", detail)).into_response()
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}
