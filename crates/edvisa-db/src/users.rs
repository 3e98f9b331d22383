//! User persistence.
//!
//! Both implementations hold the same contract:
//!
//! - lookups return `Ok(None)` for absence, never an error
//! - `create` stores an already-hashed password and fails with
//!   [`StoreError::EmailTaken`] when the email exists, atomically
//! - the password hash never leaves the store; login goes through
//!   [`UserRepository::verify_credentials`]

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edvisa_core::password::{hash_password, verify_password};
use edvisa_models::{NewUser, User, UserRole, normalize_email};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::error::StoreError;

/// Burned on unknown emails so both login failure paths cost one bcrypt check.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("edvisa-timing-equalizer").ok());

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Returns the user whose stored hash matches `password`. Unknown email
    /// and wrong password both yield `Ok(None)`.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError>;
}

fn check_password(password: &str, hash: Option<&str>) -> Result<bool, StoreError> {
    match hash {
        Some(hash) => {
            verify_password(password, hash).map_err(|e| StoreError::Credentials(e.to_string()))
        }
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            Ok(false)
        }
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<UserRole>().map_err(StoreError::Corrupt)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_row_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_row_by_email(email)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(normalize_email(&new_user.email))
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => User::try_from(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::EmailTaken),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    #[instrument(skip(self, password))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = self.fetch_row_by_email(email).await?;

        if !check_password(password, row.as_ref().map(|r| r.password_hash.as_str()))? {
            return Ok(None);
        }

        row.map(User::try_from).transpose()
    }
}

// ============================================================================
// In-memory
// ============================================================================

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<Uuid, StoredUser>,
    id_by_email: HashMap<String, Uuid>,
}

/// Process-local store used when no database is configured and in tests.
///
/// The email index and the records share one lock, so check-and-insert in
/// [`UserRepository::create`] is atomic.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .id_by_email
            .get(&normalize_email(email))
            .and_then(|id| tables.by_id.get(id))
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.by_id.get(&id).map(|stored| stored.user.clone()))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let email = normalize_email(&new_user.email);
        let mut tables = self.tables.write().await;

        if tables.id_by_email.contains_key(&email) {
            return Err(StoreError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: email.clone(),
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        tables.id_by_email.insert(email, user.id);
        tables.by_id.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );

        Ok(user)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let (user, hash) = {
            let tables = self.tables.read().await;
            match tables
                .id_by_email
                .get(&normalize_email(email))
                .and_then(|id| tables.by_id.get(id))
            {
                Some(stored) => (Some(stored.user.clone()), Some(stored.password_hash.clone())),
                None => (None, None),
            }
        };

        if check_password(password, hash.as_deref())? {
            Ok(user)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: UserRole::Student,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("Ada@Example.com", "secret1")).await.unwrap();

        assert_eq!(created.email, "ada@example.com");

        let by_email = repo.find_by_email("ADA@example.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(created.id));

        let by_id = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn test_absence_is_not_an_error() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_by_email("ghost@example.com").await.unwrap().is_none());
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("dup@example.com", "secret1")).await.unwrap();

        let second = repo.create(new_user("DUP@example.com", "secret2")).await;
        assert!(matches!(second, Err(StoreError::EmailTaken)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_creates_yield_one_success() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let hash = hash_password("secret1").unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let hash = hash.clone();
                tokio::spawn(async move {
                    repo.create(NewUser {
                        name: "Racer".to_string(),
                        email: "race@example.com".to_string(),
                        password_hash: hash,
                        role: UserRole::Student,
                    })
                    .await
                })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(StoreError::EmailTaken) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("login@example.com", "right-pass")).await.unwrap();

        let ok = repo
            .verify_credentials("login@example.com", "right-pass")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(created.id));

        let wrong = repo
            .verify_credentials("login@example.com", "wrong-pass")
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = repo
            .verify_credentials("nobody@example.com", "right-pass")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }
}
