//! # Edvisa DB
//!
//! The user store and PostgreSQL pool setup.
//!
//! - [`users`]: the [`UserRepository`] trait with a Postgres
//!   implementation and an in-memory one
//! - [`error`]: [`StoreError`] and its conversion into the API error
//!
//! # Example
//!
//! ```ignore
//! use edvisa_db::{init_db_pool, PgUserRepository, MIGRATOR};
//!
//! let pool = init_db_pool(&database_url).await?;
//! MIGRATOR.run(&pool).await?;
//! let users = PgUserRepository::new(pool);
//! ```

pub mod error;
pub mod users;

use std::env;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;
pub use users::{InMemoryUserRepository, PgUserRepository, UserRepository};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects a pool sized by `DATABASE_MAX_CONNECTIONS` (default 10).
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
