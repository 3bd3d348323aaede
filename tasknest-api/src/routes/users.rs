/// User endpoints
///
/// This module provides user account endpoints:
/// - Creation
/// - Login
///
/// Login is a placeholder for a future session implementation: on success
/// the caller receives the user's profile fields, but no token or session
/// is issued.
///
/// # Endpoints
///
/// - `POST /api/users` - Create a new user
/// - `POST /api/users/login` - Verify credentials and return the profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::password,
    models::user::{CreateUser, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Role of the new account
    pub role: UserRole,

    /// First name
    #[validate(length(min = 1, max = 255, message = "FirstName must be between 1 and 255 characters"))]
    pub first_name: String,

    /// Last name
    #[validate(length(min = 1, max = 255, message = "LastName must be between 1 and 255 characters"))]
    pub last_name: String,

    /// Username (unique, case-sensitive)
    #[validate(length(min = 3, max = 100, message = "Username must be between 3 and 100 characters"))]
    pub username: String,

    /// Plaintext password (hashed before storage, never persisted)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Creating user, if any
    pub created_by: Option<Uuid>,
}

/// Create user response: the user record without the password hash
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub created_date: DateTime<Utc>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Login response: profile fields only, no token
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Creates a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// {
///   "role": "user",
///   "firstName": "John",
///   "lastName": "Doe",
///   "username": "jdoe",
///   "password": "hunter22"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or username already taken
/// - `500 Internal Server Error`: Server error
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<CreateUserResponse>> {
    req.validate()?;

    // Case-sensitive exact match; the unique index is the backstop for the
    // race between this check and the insert.
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Username '{}' is already taken.",
            req.username
        )));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            role: req.role,
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            password_hash,
            created_by: req.created_by,
        },
    )
    .await?;

    Ok(Json(CreateUserResponse {
        user_id: user.id,
        role: user.role,
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
        created_date: user.created_at,
    }))
}

/// Verifies credentials and returns the user's profile
///
/// Unknown usernames and wrong passwords produce the identical generic
/// error so callers cannot tell which part failed.
///
/// # Endpoint
///
/// ```text
/// POST /api/users/login
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "password": "hunter22"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password.".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password.".to_string(),
        ));
    }

    Ok(Json(LoginResponse {
        user_id: user.id,
        role: user.role,
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
    }))
}
