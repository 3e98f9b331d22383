//! Access to the server's login and refresh endpoints.

use async_trait::async_trait;
use edvisa_core::ErrorEnvelope;
use edvisa_models::{AuthResponse, RefreshRequest};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::error::SessionError;

#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, SessionError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, SessionError>;
}

/// Talks to `{base_url}/api/auth/*` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthTransport {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpAuthTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/auth/{}", self.base_url, path)
    }

    async fn read_auth_response(response: Response) -> Result<AuthResponse, SessionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<AuthResponse>().await?);
        }

        let (code, message) = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => (envelope.code, envelope.message),
            Err(_) => (
                "unknown".to_string(),
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            ),
        };

        Err(SessionError::Rejected {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl AuthTransport for HttpAuthTransport {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, SessionError> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&LoginBody { email, password })
            .send()
            .await?;

        Self::read_auth_response(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, SessionError> {
        let response = self
            .client
            .post(self.endpoint("refresh"))
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        Self::read_auth_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let transport = HttpAuthTransport::new("http://localhost:3000/");
        assert_eq!(
            transport.endpoint("refresh"),
            "http://localhost:3000/api/auth/refresh"
        );
    }
}
