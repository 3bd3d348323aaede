/// Task endpoints
///
/// This module provides the task CRUD endpoints:
///
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks/user/:user_id` - List a user's tasks with search,
///   completion filter, sort, and pagination
/// - `GET /api/tasks/:task_id` - Fetch a task with its subtasks
/// - `PATCH /api/tasks/:task_id` - Partially update a task
/// - `POST /api/tasks/delete` - Delete a task (cascades to subtasks)
///
/// Partial-update semantics: `taskName` and `description` are written only
/// when supplied. The completion timestamp is different: the wire format
/// cannot distinguish "field omitted" from "field set to null", so the
/// request carries an explicit `completedDateProvided` flag; only when it
/// is true is `completedDate` written (a null value clears the timestamp).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldError},
    routes::subtasks::SubtaskDto,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tasknest_shared::models::{
    subtask::Subtask,
    task::{CreateTask, SortDirection, Task, TaskListQuery, TaskSort, UpdateTaskFields},
    user::User,
};
use uuid::Uuid;
use validator::Validate;

/// Largest accepted page size
const MAX_PAGE_SIZE: i64 = 100;

/// Task projection returned by every task endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub task_name: String,
    pub description: String,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub subtasks: Vec<SubtaskDto>,
}

impl TaskDto {
    /// Builds the projection from a task and its subtasks
    pub fn from_task(task: Task, subtasks: Vec<Subtask>) -> Self {
        TaskDto {
            task_id: task.id,
            user_id: task.user_id,
            task_name: task.name,
            description: task.description,
            completed_date: task.completed_at,
            created_date: task.created_at,
            subtasks: subtasks.into_iter().map(SubtaskDto::from_subtask).collect(),
        }
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Owning user (must exist)
    pub user_id: Uuid,

    /// Task name
    #[validate(length(min = 1, max = 255, message = "TaskName must be between 1 and 255 characters"))]
    pub task_name: String,

    /// Free-text description (defaults to empty)
    #[serde(default)]
    pub description: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

/// Query parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    /// 1-based page number; pagination applies only when pageSize is also
    /// supplied
    pub page_number: Option<i64>,

    /// Page size (1–100)
    pub page_size: Option<i64>,

    /// Sort field: createdDate, name, or completedDate
    pub sort_by: Option<String>,

    /// Sort direction: asc or desc
    pub sort_direction: Option<String>,

    /// Case-insensitive substring search over name and description
    pub search_term: Option<String>,

    /// true = only completed tasks, false = only incomplete
    pub completed: Option<bool>,
}

/// List tasks response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskDto>,

    /// Total matching count, independent of pagination
    pub total_count: i64,

    pub page_number: i64,
    pub page_size: i64,

    /// Whether further pages exist; only meaningful when the caller
    /// supplied both paging parameters
    pub has_more: bool,
}

/// Update task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New task name, if supplied
    #[validate(length(min = 1, max = 255, message = "TaskName must be between 1 and 255 characters"))]
    pub task_name: Option<String>,

    /// New description, if supplied
    pub description: Option<String>,

    /// New completion timestamp; only consulted when
    /// `completedDateProvided` is true
    pub completed_date: Option<DateTime<Utc>>,

    /// Explicit "the caller wants completedDate written" flag; true with a
    /// null completedDate clears the completion
    #[serde(default)]
    pub completed_date_provided: bool,
}

/// Delete task request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskRequest {
    pub task_id: Uuid,
}

/// Result of a delete operation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResponse {
    pub success: bool,
    pub message: String,
}

/// Creates a new task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Owning user does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskDto>> {
    req.validate()?;

    if !User::exists(&state.db, req.user_id).await? {
        return Err(ApiError::NotFound(format!(
            "User with ID {} does not exist.",
            req.user_id
        )));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: req.user_id,
            name: req.task_name,
            description: req.description,
            created_by: req.created_by,
        },
    )
    .await?;

    Ok(Json(TaskDto::from_task(task, Vec::new())))
}

/// Lists a user's tasks with filtering, sorting, and pagination
///
/// Pagination applies only when BOTH `pageNumber` and `pageSize` are
/// supplied; otherwise the full filtered result set is returned and
/// `hasMore` is false.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid query parameters
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<ListTasksParams>,
) -> ApiResult<Json<ListTasksResponse>> {
    let query = validate_list_params(&params)?;

    let total_count = Task::count_for_user(&state.db, user_id, &query).await?;
    let tasks = Task::list_for_user(&state.db, user_id, &query).await?;

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut subtasks_by_task: HashMap<Uuid, Vec<Subtask>> = HashMap::new();
    for subtask in Subtask::list_by_task_ids(&state.db, &task_ids).await? {
        subtasks_by_task
            .entry(subtask.task_id)
            .or_default()
            .push(subtask);
    }

    let task_dtos: Vec<TaskDto> = tasks
        .into_iter()
        .map(|task| {
            let subtasks = subtasks_by_task.remove(&task.id).unwrap_or_default();
            TaskDto::from_task(task, subtasks)
        })
        .collect();

    let has_more = match query.page {
        Some((page_number, page_size)) => page_number * page_size < total_count,
        None => false,
    };

    Ok(Json(ListTasksResponse {
        tasks: task_dtos,
        total_count,
        page_number: params.page_number.unwrap_or(1),
        page_size: params.page_size.unwrap_or(total_count),
        has_more,
    }))
}

/// Validates list query parameters and assembles the model-layer query
///
/// All violations are collected into a single 400 response rather than
/// reporting only the first.
fn validate_list_params(params: &ListTasksParams) -> Result<TaskListQuery, ApiError> {
    let mut errors = Vec::new();

    if let Some(page_number) = params.page_number {
        if page_number < 1 {
            errors.push(FieldError {
                field: "pageNumber".to_string(),
                message: "PageNumber must be 1 or greater".to_string(),
            });
        }
    }

    if let Some(page_size) = params.page_size {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.push(FieldError {
                field: "pageSize".to_string(),
                message: format!("PageSize must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
    }

    let sort = match params.sort_by.as_deref() {
        None => TaskSort::default(),
        Some(value) => TaskSort::parse(value).unwrap_or_else(|| {
            errors.push(FieldError {
                field: "sortBy".to_string(),
                message: "SortBy must be one of createdDate, name, completedDate".to_string(),
            });
            TaskSort::default()
        }),
    };

    let direction = match params.sort_direction.as_deref() {
        None => SortDirection::default(),
        Some(value) => SortDirection::parse(value).unwrap_or_else(|| {
            errors.push(FieldError {
                field: "sortDirection".to_string(),
                message: "SortDirection must be asc or desc".to_string(),
            });
            SortDirection::default()
        }),
    };

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Pagination is all-or-nothing: a lone pageNumber or pageSize is
    // ignored and the full result set is returned.
    let page = match (params.page_number, params.page_size) {
        (Some(page_number), Some(page_size)) => Some((page_number, page_size)),
        _ => None,
    };

    Ok(TaskListQuery {
        search: params.search_term.clone(),
        completed: params.completed,
        sort,
        direction,
        page,
    })
}

/// Fetches a task and all of its subtasks
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskDto>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Task with ID {} does not exist.", task_id))
        })?;

    let subtasks = Subtask::list_by_task(&state.db, task_id).await?;

    Ok(Json(TaskDto::from_task(task, subtasks)))
}

/// Partially updates a task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Task does not exist
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDto>> {
    req.validate()?;

    let fields = UpdateTaskFields {
        name: req.task_name,
        description: req.description,
        completed_at: req.completed_date_provided.then_some(req.completed_date),
    };

    let task = Task::update(&state.db, task_id, fields)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Task with ID {} does not exist.", task_id))
        })?;

    let subtasks = Subtask::list_by_task(&state.db, task_id).await?;

    Ok(Json(TaskDto::from_task(task, subtasks)))
}

/// Deletes a task and all of its subtasks
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
pub async fn delete_task(
    State(state): State<AppState>,
    Json(req): Json<DeleteTaskRequest>,
) -> ApiResult<Json<DeletionResponse>> {
    let deleted = Task::delete(&state.db, req.task_id).await?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Task with ID {} does not exist.",
            req.task_id
        )));
    }

    Ok(Json(DeletionResponse {
        success: true,
        message: format!(
            "Task {} and its subtasks have been deleted successfully.",
            req.task_id
        ),
    }))
}
