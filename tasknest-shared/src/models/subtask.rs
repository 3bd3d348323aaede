/// Subtask model and database operations
///
/// Subtasks belong to a task and carry their own independent completion
/// timestamp. Deleting the owning task deletes its subtasks (CASCADE).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subtasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     completed_at TIMESTAMPTZ,
///     created_by UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subtask model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subtask {
    /// Unique subtask ID
    pub id: Uuid,

    /// Owning task
    pub task_id: Uuid,

    /// Free-text description
    pub description: String,

    /// When the subtask was completed (None = incomplete)
    pub completed_at: Option<DateTime<Utc>>,

    /// User that created the subtask, if recorded
    pub created_by: Option<Uuid>,

    /// When the subtask was created (set server-side)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new subtask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtask {
    /// Owning task (must exist)
    pub task_id: Uuid,

    /// Free-text description
    pub description: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

/// Input for updating a subtask
///
/// Unlike tasks, the completion timestamp is ALWAYS written with whatever
/// value is supplied here; None clears it. Only the description is
/// conditionally updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateSubtaskFields {
    /// New description (None = leave untouched)
    pub description: Option<String>,

    /// New completion timestamp (None = clear)
    pub completed_at: Option<DateTime<Utc>>,
}

impl Subtask {
    /// Creates a new subtask
    pub async fn create(pool: &PgPool, data: CreateSubtask) -> Result<Self, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (task_id, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, description, completed_at, created_by, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(subtask)
    }

    /// Finds a subtask by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, description, completed_at, created_by, created_at
            FROM subtasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Lists all subtasks of a task (unordered)
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, description, completed_at, created_by, created_at
            FROM subtasks
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Lists all subtasks belonging to any of the given tasks
    ///
    /// Used by the task list endpoint to attach subtasks to a whole page of
    /// tasks in one round trip.
    pub async fn list_by_task_ids(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, description, completed_at, created_by, created_at
            FROM subtasks
            WHERE task_id = ANY($1)
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Updates a subtask
    ///
    /// The completion timestamp is overwritten unconditionally; the
    /// description only when supplied.
    ///
    /// # Returns
    ///
    /// The updated subtask, or None if no subtask with that ID exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSubtaskFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sql = String::from("UPDATE subtasks SET completed_at = $2");

        if data.description.is_some() {
            sql.push_str(", description = $3");
        }

        sql.push_str(
            " WHERE id = $1 RETURNING id, task_id, description, completed_at, \
             created_by, created_at",
        );

        let mut q = sqlx::query_as::<_, Subtask>(&sql)
            .bind(id)
            .bind(data.completed_at);

        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let subtask = q.fetch_optional(pool).await?;

        Ok(subtask)
    }

    /// Deletes a subtask
    ///
    /// # Returns
    ///
    /// True if the subtask was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_subtask_fields_default_clears_completion() {
        // A default update carries completed_at = None, which the update
        // writes through, clearing any previous completion.
        let fields = UpdateSubtaskFields::default();
        assert!(fields.description.is_none());
        assert!(fields.completed_at.is_none());
    }

    // Integration tests for database operations are in tasknest-api/tests/
}
