//! Edvisa CLI library
//!
//! Account provisioning and seeding, written against [`UserRepository`] so
//! the same code runs on Postgres and on the in-memory store.

use anyhow::{Context, Result, anyhow};
use edvisa_core::hash_password;
use edvisa_db::{StoreError, UserRepository};
use edvisa_models::{NewUser, RegisterRequest, User, UserRole, validate_registration};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;

/// Password given to every seeded student.
pub const SEED_PASSWORD: &str = "password123";

/// Creates an admin account after running the same checks as public
/// registration.
pub async fn create_admin(
    users: &dyn UserRepository,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let validated = validate_registration(&RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: Some(UserRole::Admin.as_str().to_string()),
    })
    .map_err(|e| anyhow!("{}", e))?;

    let password_hash = hash_password(&validated.password).map_err(|e| anyhow!("{}", e))?;

    users
        .create(NewUser {
            name: validated.name,
            email: validated.email,
            password_hash,
            role: validated.role,
        })
        .await
        .context("Failed to create admin")
}

/// Inserts `count` students with generated names. Generated emails that
/// collide with existing accounts are skipped. Returns how many were created.
pub async fn seed_students(users: &dyn UserRepository, count: usize) -> Result<usize> {
    // All seeded accounts share one hash; bcrypt is too slow to run per row.
    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| anyhow!("{}", e))?;
    let mut created = 0;

    for _ in 0..count {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let result = users
            .create(NewUser {
                name,
                email: email.to_lowercase(),
                password_hash: password_hash.clone(),
                role: UserRole::Student,
            })
            .await;

        match result {
            Ok(_) => created += 1,
            Err(StoreError::EmailTaken) => continue,
            Err(e) => return Err(e).context("Failed to seed student"),
        }
    }

    Ok(created)
}
