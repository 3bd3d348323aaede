/// Subtask endpoints
///
/// - `POST /api/tasks/subtask` - Create a subtask
/// - `PATCH /api/tasks/subtask/:subtask_id` - Partially update a subtask
/// - `POST /api/tasks/subtask/delete` - Delete a subtask
///
/// Unlike tasks, a subtask update always overwrites the completion
/// timestamp with whatever `completedDate` the request carries; supplying
/// null clears it, so no "provided" flag is needed.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::DeletionResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasknest_shared::models::{
    subtask::{CreateSubtask, Subtask, UpdateSubtaskFields},
    task::Task,
};
use uuid::Uuid;
use validator::Validate;

/// Subtask projection returned by every subtask endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskDto {
    pub subtask_id: Uuid,
    pub task_id: Uuid,
    pub description: String,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
}

impl SubtaskDto {
    /// Builds the projection from a subtask record
    pub fn from_subtask(subtask: Subtask) -> Self {
        SubtaskDto {
            subtask_id: subtask.id,
            task_id: subtask.task_id,
            description: subtask.description,
            completed_date: subtask.completed_at,
            created_date: subtask.created_at,
        }
    }
}

/// Create subtask request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubtaskRequest {
    /// Owning task (must exist)
    pub task_id: Uuid,

    /// Free-text description
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

/// Update subtask request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtaskRequest {
    /// New description, if supplied
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    /// New completion timestamp; always written, null clears
    pub completed_date: Option<DateTime<Utc>>,
}

/// Delete subtask request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSubtaskRequest {
    pub subtask_id: Uuid,
}

/// Creates a new subtask
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Owning task does not exist
pub async fn create_subtask(
    State(state): State<AppState>,
    Json(req): Json<CreateSubtaskRequest>,
) -> ApiResult<Json<SubtaskDto>> {
    req.validate()?;

    if !Task::exists(&state.db, req.task_id).await? {
        return Err(ApiError::NotFound(format!(
            "Task with ID {} does not exist.",
            req.task_id
        )));
    }

    let subtask = Subtask::create(
        &state.db,
        CreateSubtask {
            task_id: req.task_id,
            description: req.description,
            created_by: req.created_by,
        },
    )
    .await?;

    Ok(Json(SubtaskDto::from_subtask(subtask)))
}

/// Partially updates a subtask
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Subtask does not exist
pub async fn update_subtask(
    State(state): State<AppState>,
    Path(subtask_id): Path<Uuid>,
    Json(req): Json<UpdateSubtaskRequest>,
) -> ApiResult<Json<SubtaskDto>> {
    req.validate()?;

    let subtask = Subtask::update(
        &state.db,
        subtask_id,
        UpdateSubtaskFields {
            description: req.description,
            completed_at: req.completed_date,
        },
    )
    .await?
    .ok_or_else(|| {
        ApiError::NotFound(format!("Subtask with ID {} does not exist.", subtask_id))
    })?;

    Ok(Json(SubtaskDto::from_subtask(subtask)))
}

/// Deletes a subtask
///
/// # Errors
///
/// - `404 Not Found`: Subtask does not exist
pub async fn delete_subtask(
    State(state): State<AppState>,
    Json(req): Json<DeleteSubtaskRequest>,
) -> ApiResult<Json<DeletionResponse>> {
    let deleted = Subtask::delete(&state.db, req.subtask_id).await?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Subtask with ID {} does not exist.",
            req.subtask_id
        )));
    }

    Ok(Json(DeletionResponse {
        success: true,
        message: format!("Subtask {} has been deleted successfully.", req.subtask_id),
    }))
}
