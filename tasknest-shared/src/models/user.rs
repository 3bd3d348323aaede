/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Users own tasks; a user cannot be deleted while tasks still
/// reference it (RESTRICT on the foreign key).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     role user_role NOT NULL DEFAULT 'user',
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_by UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::user::{User, CreateUser, UserRole};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     role: UserRole::User,
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     username: "jdoe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     created_by: None,
/// }).await?;
///
/// // Lookup by username (case-sensitive exact match)
/// let found = User::find_by_username(&pool, "jdoe").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    User,

    /// Administrator
    Admin,
}

impl UserRole {
    /// Converts role to string for logging and display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

/// User model representing a user account
///
/// Passwords are stored as argon2 hashes, never in plaintext. The hash is
/// never included in API responses (response shaping happens in the routes
/// layer).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Role of the account
    pub role: UserRole,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Username (case-sensitive, unique across all users)
    pub username: String,

    /// Argon2 password hash (PHC string format)
    pub password_hash: String,

    /// User that created this account (None for seed bootstrap)
    pub created_by: Option<Uuid>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Role of the new account
    pub role: UserRole,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Username (must be unique)
    pub username: String,

    /// Argon2 password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint
    /// violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (role, first_name, last_name, username, password_hash, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, role, first_name, last_name, username, password_hash,
                      created_by, created_at
            "#,
        )
        .bind(data.role)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, role, first_name, last_name, username, password_hash,
                   created_by, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// The match is case-sensitive and exact: `"Admin"` and `"admin"` are
    /// different usernames.
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, role, first_name, last_name, username, password_hash,
                   created_by, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a user with the given ID exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Deletes a user by ID
    ///
    /// Fails with a foreign key violation while any tasks still reference
    /// the user (RESTRICT).
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts users with the given username
    ///
    /// Used by tests to assert that duplicate-username rejections did not
    /// leave a second row behind.
    pub async fn count_by_username(pool: &PgPool, username: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
