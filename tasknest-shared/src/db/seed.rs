/// Startup seed bootstrap
///
/// Ensures the default admin account exists so a fresh deployment can be
/// signed into immediately. The default credentials are admin/admin123 and
/// are expected to be changed in any real deployment.

use crate::auth::password::{hash_password, PasswordError};
use crate::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tracing::info;

/// Username of the bootstrap account
pub const ADMIN_USERNAME: &str = "admin";

/// Error type for seed operations
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Database operation failed
    #[error("Seed query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Hashing the bootstrap password failed
    #[error("Seed password hashing failed: {0}")]
    Password(#[from] PasswordError),
}

/// Creates the admin user if it does not exist yet
///
/// Idempotent: running it against an already-seeded database is a no-op.
pub async fn seed_admin(pool: &PgPool) -> Result<(), SeedError> {
    if User::find_by_username(pool, ADMIN_USERNAME).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password("admin123")?;

    let admin = User::create(
        pool,
        CreateUser {
            role: UserRole::Admin,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            username: ADMIN_USERNAME.to_string(),
            password_hash,
            created_by: None,
        },
    )
    .await?;

    info!(user_id = %admin.id, "Seeded default admin user");
    Ok(())
}
