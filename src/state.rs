use std::sync::Arc;

use edvisa_auth::TokenIssuer;
use edvisa_config::{AppEnvironment, CorsConfig, JwtConfig};
use edvisa_db::{InMemoryUserRepository, MIGRATOR, PgUserRepository, UserRepository, init_db_pool};
use tracing::{info, warn};

/// Shared, cheaply cloneable application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenIssuer>,
    pub environment: AppEnvironment,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenIssuer,
        environment: AppEnvironment,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            users,
            tokens: Arc::new(tokens),
            environment,
            cors_config,
        }
    }
}

/// Builds the state from the environment.
///
/// Uses Postgres when `DATABASE_URL` is set and runs pending migrations.
/// Outside production a missing `DATABASE_URL` falls back to an in-memory
/// store; in production it is an error.
pub async fn init_app_state(environment: AppEnvironment) -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env();
    jwt_config.ensure_production_ready(environment)?;

    let users: Arc<dyn UserRepository> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = init_db_pool(&database_url).await?;
            MIGRATOR.run(&pool).await?;
            info!("Connected to database and applied migrations");
            Arc::new(PgUserRepository::new(pool))
        }
        Err(_) if environment.is_production() => {
            anyhow::bail!("DATABASE_URL must be set in production");
        }
        Err(_) => {
            warn!("DATABASE_URL not set, using in-memory user store; data is lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    Ok(AppState::new(
        users,
        TokenIssuer::new(&jwt_config),
        environment,
        CorsConfig::from_env(),
    ))
}
