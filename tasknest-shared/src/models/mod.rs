/// Database models for TaskNest
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts (owners of tasks)
/// - `task`: To-do items belonging to a user
/// - `subtask`: Sub-items of a task with independent completion state
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
/// let new_user = CreateUser {
///     role: UserRole::User,
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     username: "jdoe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     created_by: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod subtask;
pub mod task;
pub mod user;
