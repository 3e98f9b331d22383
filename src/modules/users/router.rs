use axum::{Router, middleware, routing::get};

use super::controller::{get_profile, get_user};
use crate::middleware::auth::authenticate;
use crate::middleware::role::require_admin;
use crate::state::AppState;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/me", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin = Router::new()
        .route("/{id}", get(get_user))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    authenticated.merge(admin)
}
