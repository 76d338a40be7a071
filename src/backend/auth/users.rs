/**
 * User Model and Directory
 *
 * Users are owned by an external account service; this crate only reads them
 * to resolve invitation emails and to name plan writers. `create_user` exists
 * for seeding development databases and tests.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::plan::error::RepositoryError;

/// User struct representing a user in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Display name
    pub username: String,
    /// User email address
    pub email: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

/// Lookup of users by email
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `username` - Display name
/// * `email` - User email
///
/// # Returns
/// Created user or error
pub async fn create_user(pool: &PgPool, username: &str, email: &str) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `email` - User email
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, created_at
        FROM users
        WHERE email = $1
        "#
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// `UserDirectory` over the `users` table
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(get_user_by_email(&self.pool, email).await?)
    }
}
