/// Task model and database operations
///
/// This module provides the Task model representing to-do items owned by a
/// user, plus the sort/filter/pagination query assembly used by the task
/// list endpoint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     completed_at TIMESTAMPTZ,
///     created_by UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Completion is modeled as "timestamp present or absent": `completed_at`
/// NULL means incomplete, any non-null value means complete.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task::{Task, CreateTask, TaskListQuery};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     name: "Buy groceries".to_string(),
///     description: "Milk, eggs, bread".to_string(),
///     created_by: None,
/// }).await?;
///
/// // List with defaults: all tasks, newest first
/// let query = TaskListQuery::default();
/// let tasks = Task::list_for_user(&pool, task.user_id, &query).await?;
/// let total = Task::count_for_user(&pool, task.user_id, &query).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Sortable task fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Sort by creation timestamp (the default)
    #[default]
    CreatedDate,

    /// Sort by task name
    Name,

    /// Sort by completion timestamp; incomplete tasks (NULL) sort first
    /// ascending and last descending
    CompletedDate,
}

impl TaskSort {
    /// Parses a wire-format sort field name (case-insensitive)
    ///
    /// Returns None for anything outside {createdDate, name, completedDate}.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "createddate" => Some(TaskSort::CreatedDate),
            "name" => Some(TaskSort::Name),
            "completeddate" => Some(TaskSort::CompletedDate),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,

    #[default]
    Desc,
}

impl SortDirection {
    /// Parses a wire-format direction (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Validated sort/filter/pagination parameters for the task list
///
/// Built by the routes layer after query-parameter validation; the model
/// layer turns it into SQL. `page` is present only when the caller supplied
/// BOTH a page number and a page size; otherwise the full result set is
/// returned.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    /// Case-insensitive substring search over name and description
    pub search: Option<String>,

    /// Some(true) = only completed, Some(false) = only incomplete
    pub completed: Option<bool>,

    /// Sort field
    pub sort: TaskSort,

    /// Sort direction
    pub direction: SortDirection,

    /// (1-based page number, page size)
    pub page: Option<(i64, i64)>,
}

impl TaskListQuery {
    /// Returns the ORDER BY clause for this query
    ///
    /// The field list is a closed enum, so the clause is assembled from
    /// static fragments and nothing caller-controlled is interpolated.
    pub fn order_clause(&self) -> &'static str {
        match (self.sort, self.direction) {
            (TaskSort::CreatedDate, SortDirection::Asc) => " ORDER BY created_at ASC",
            (TaskSort::CreatedDate, SortDirection::Desc) => " ORDER BY created_at DESC",
            (TaskSort::Name, SortDirection::Asc) => " ORDER BY name ASC",
            (TaskSort::Name, SortDirection::Desc) => " ORDER BY name DESC",
            (TaskSort::CompletedDate, SortDirection::Asc) => {
                " ORDER BY completed_at ASC NULLS FIRST"
            }
            (TaskSort::CompletedDate, SortDirection::Desc) => {
                " ORDER BY completed_at DESC NULLS LAST"
            }
        }
    }

    /// Returns the ILIKE pattern for the search term, if any
    ///
    /// The term is trimmed and LIKE metacharacters are escaped so a literal
    /// `%` in a task name can be searched for. Whitespace-only terms are
    /// treated as absent, matching how the list endpoint ignores them.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        Some(format!("%{}%", escape_like(term)))
    }
}

/// Escapes LIKE/ILIKE metacharacters (`\`, `%`, `_`) with a backslash
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Task model representing a to-do item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task name (at most 255 characters)
    pub name: String,

    /// Free-text description
    pub description: String,

    /// When the task was completed (None = incomplete)
    pub completed_at: Option<DateTime<Utc>>,

    /// User that created the task, if recorded
    pub created_by: Option<Uuid>,

    /// When the task was created (set server-side)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user (must exist)
    pub user_id: Uuid,

    /// Task name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

/// Input for partially updating a task
///
/// `None` means "leave the column untouched". The completion timestamp is
/// doubly optional: the outer level is the caller's explicit "this field
/// was provided" flag, the inner level is the new value. `Some(None)`
/// clears a previously-set completion.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskFields {
    /// New task name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New completion timestamp (Some(None) = clear)
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl Task {
    /// Creates a new task
    ///
    /// The creation timestamp is set server-side by the database default.
    ///
    /// # Errors
    ///
    /// Returns an error if the owning user does not exist (foreign key
    /// violation) or the database operation fails. Callers check existence
    /// first to report a clean not-found error.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, name, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, description, completed_at, created_by, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, name, description, completed_at, created_by, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Checks whether a task with the given ID exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Lists a user's tasks with the given filters, sort, and pagination
    ///
    /// Filters and sort are applied in SQL; when `query.page` is present the
    /// window is `LIMIT page_size OFFSET (page_number - 1) * page_size`.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        query: &TaskListQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = query.search_pattern();

        let mut sql = String::from(
            "SELECT id, user_id, name, description, completed_at, created_by, created_at \
             FROM tasks WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if pattern.is_some() {
            bind_count += 1;
            sql.push_str(&format!(
                " AND (name ILIKE ${b} OR description ILIKE ${b})",
                b = bind_count
            ));
        }
        match query.completed {
            Some(true) => sql.push_str(" AND completed_at IS NOT NULL"),
            Some(false) => sql.push_str(" AND completed_at IS NULL"),
            None => {}
        }

        sql.push_str(query.order_clause());

        if query.page.is_some() {
            sql.push_str(&format!(
                " LIMIT ${} OFFSET ${}",
                bind_count + 1,
                bind_count + 2
            ));
        }

        let mut q = sqlx::query_as::<_, Task>(&sql).bind(user_id);

        if let Some(pattern) = pattern {
            q = q.bind(pattern);
        }
        if let Some((page_number, page_size)) = query.page {
            q = q.bind(page_size).bind((page_number - 1) * page_size);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts a user's tasks matching the given filters
    ///
    /// Applies the same search and completion filters as [`list_for_user`]
    /// but ignores sort and pagination, so the count is the total for the
    /// whole filtered set.
    ///
    /// [`list_for_user`]: Task::list_for_user
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: Uuid,
        query: &TaskListQuery,
    ) -> Result<i64, sqlx::Error> {
        let pattern = query.search_pattern();

        let mut sql = String::from("SELECT COUNT(*) FROM tasks WHERE user_id = $1");

        if pattern.is_some() {
            sql.push_str(" AND (name ILIKE $2 OR description ILIKE $2)");
        }
        match query.completed {
            Some(true) => sql.push_str(" AND completed_at IS NOT NULL"),
            Some(false) => sql.push_str(" AND completed_at IS NULL"),
            None => {}
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&sql).bind(user_id);

        if let Some(pattern) = pattern {
            q = q.bind(pattern);
        }

        let (count,) = q.fetch_one(pool).await?;

        Ok(count)
    }

    /// Partially updates a task
    ///
    /// Only the fields present in `data` are written; the completion
    /// timestamp is written (possibly to NULL) exactly when its outer
    /// option is Some.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task with that ID exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTaskFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.name.is_none() && data.description.is_none() && data.completed_at.is_none() {
            // Nothing to write; a no-op PATCH still returns the current row.
            return Self::find_by_id(pool, id).await;
        }

        let mut assignments = Vec::new();
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            assignments.push(format!("name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if data.completed_at.is_some() {
            bind_count += 1;
            assignments.push(format!("completed_at = ${}", bind_count));
        }

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = $1 RETURNING id, user_id, name, description, \
             completed_at, created_by, created_at",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Task>(&sql).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed_at) = data.completed_at {
            q = q.bind(completed_at);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// All of the task's subtasks are deleted as well (CASCADE).
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
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
    fn test_task_sort_parse() {
        assert_eq!(TaskSort::parse("createdDate"), Some(TaskSort::CreatedDate));
        assert_eq!(TaskSort::parse("CREATEDDATE"), Some(TaskSort::CreatedDate));
        assert_eq!(TaskSort::parse("name"), Some(TaskSort::Name));
        assert_eq!(TaskSort::parse("completedDate"), Some(TaskSort::CompletedDate));
        assert_eq!(TaskSort::parse("priority"), None);
        assert_eq!(TaskSort::parse(""), None);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("ascending"), None);
    }

    #[test]
    fn test_default_sort_is_created_date_desc() {
        let query = TaskListQuery::default();
        assert_eq!(query.order_clause(), " ORDER BY created_at DESC");
    }

    #[test]
    fn test_completed_date_sort_places_nulls_consistently() {
        // Ascending: incomplete (NULL) tasks come first
        let query = TaskListQuery {
            sort: TaskSort::CompletedDate,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        assert_eq!(query.order_clause(), " ORDER BY completed_at ASC NULLS FIRST");

        // Descending: incomplete tasks come last
        let query = TaskListQuery {
            sort: TaskSort::CompletedDate,
            direction: SortDirection::Desc,
            ..Default::default()
        };
        assert_eq!(query.order_clause(), " ORDER BY completed_at DESC NULLS LAST");
    }

    #[test]
    fn test_search_pattern_trims_and_wraps() {
        let query = TaskListQuery {
            search: Some("  groceries ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern(), Some("%groceries%".to_string()));
    }

    #[test]
    fn test_search_pattern_blank_is_absent() {
        let query = TaskListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern(), None);

        let query = TaskListQuery::default();
        assert_eq!(query.search_pattern(), None);
    }

    #[test]
    fn test_search_pattern_escapes_metacharacters() {
        let query = TaskListQuery {
            search: Some("50%_done\\".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern(), Some("%50\\%\\_done\\\\%".to_string()));
    }

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("plain text"), "plain text");
    }

    #[test]
    fn test_update_task_fields_default_is_noop() {
        let fields = UpdateTaskFields::default();
        assert!(fields.name.is_none());
        assert!(fields.description.is_none());
        assert!(fields.completed_at.is_none());
    }
}
