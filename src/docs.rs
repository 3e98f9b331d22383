use edvisa_auth::Identity;
use edvisa_core::ErrorEnvelope;
use edvisa_models::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User, UserRole,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_tokens,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::get_user,
    ),
    components(
        schemas(
            User,
            UserRole,
            Identity,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenPair,
            AuthResponse,
            ErrorEnvelope,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "User profile endpoints")
    ),
    info(
        title = "Edvisa API",
        version = "0.1.0",
        description = "Authentication and session lifecycle for the Edvisa platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
