//! Shared helpers for integration tests.
//!
//! Every test app runs on the in-memory user store and a manual clock, so
//! no database is required and token expiry is deterministic.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use edvisa::router::init_router;
use edvisa::state::AppState;
use edvisa_auth::{ManualClock, TokenIssuer};
use edvisa_config::{AppEnvironment, CorsConfig, JwtConfig};
use edvisa_core::hash_password;
use edvisa_db::{InMemoryUserRepository, UserRepository};
use edvisa_models::{NewUser, User, UserRole};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<ManualClock>,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret-that-is-long-enough-1234".to_string(),
        refresh_secret: "test-refresh-secret-that-is-long-enough-5678".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_in(AppEnvironment::Test)
}

pub fn spawn_app_in(environment: AppEnvironment) -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(ManualClock::starting_now());
    let tokens = TokenIssuer::with_clock(&test_jwt_config(), clock.clone());

    let state = AppState::new(
        users.clone(),
        tokens,
        environment,
        CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    );

    TestApp {
        router: init_router(state.clone()),
        state,
        users,
        clock,
    }
}

/// A generated address, made unique so parallel seeding never collides.
pub fn fake_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}.{}", Uuid::new_v4().simple(), email.to_lowercase())
}

pub fn fake_name() -> String {
    Name().fake()
}

impl TestApp {
    /// Inserts a user directly into the store with [`PASSWORD`].
    pub async fn seed_user(&self, role: UserRole) -> User {
        self.users
            .create(NewUser {
                name: fake_name(),
                email: fake_email(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    pub fn access_token_for(&self, user: &User) -> String {
        self.state.tokens.issue_access_token(user).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, token).await
    }
}
