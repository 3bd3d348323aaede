/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// to a problem-details body with the appropriate status code.
///
/// Each variant carries its HTTP status directly. No inspection of message
/// content happens anywhere, so rewording an error message can never change
/// which status a condition maps to.
///
/// # Example
///
/// ```ignore
/// use tasknest_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<TaskDto>> {
///     let task = Task::find_by_id(&pool, id)
///         .await?
///         .ok_or_else(|| ApiError::NotFound(format!("Task {} does not exist", id)))?;
///     Ok(Json(project(task)))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
///
/// Variants are tagged with their target HTTP status:
///
/// - `Validation` / `BadRequest` / `Conflict` → 400
/// - `Unauthorized` → 401
/// - `NotFound` → 404
/// - `RateLimited` → 429
/// - `Internal` → 500
///
/// Duplicate-username conflicts map to 400 (not 409) to keep the original
/// wire contract; the distinct variant keeps the taxonomy explicit.
#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation failures (400)
    Validation(Vec<FieldError>),

    /// Malformed request or query parameters (400)
    BadRequest(String),

    /// Authentication failure (401); message intentionally generic
    Unauthorized(String),

    /// Referenced entity does not exist (404)
    NotFound(String),

    /// Uniqueness conflict, e.g. duplicate username (400)
    Conflict(String),

    /// Rate limit exceeded (429)
    RateLimited {
        /// Seconds until the next window opens
        retry_after: u64,
    },

    /// Unhandled/internal error (500); detail suppressed in release builds
    Internal(String),
}

/// Detail of a single field validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Problem-details error body
///
/// Shape: `{status, title, detail, instance, errors?}`. The `instance`
/// path is stamped by [`stamp_instance`] since the error value itself has
/// no access to the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// HTTP status code
    pub status: u16,

    /// Short, human-readable summary of the error class
    pub title: String,

    /// Human-readable explanation of this occurrence
    pub detail: String,

    /// Request path that produced the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Field-level validation failures, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiError {
    /// The HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the problem-details body for this error
    ///
    /// Internal error detail is only exposed in debug builds; release
    /// builds log it and return a generic message.
    pub fn to_problem(&self) -> ProblemDetails {
        let (title, detail, errors) = match self {
            ApiError::Validation(errors) => (
                "Validation error",
                "Request validation failed".to_string(),
                Some(errors.clone()),
            ),
            ApiError::BadRequest(msg) => ("Invalid request", msg.clone(), None),
            ApiError::Unauthorized(msg) => ("Authentication failed", msg.clone(), None),
            ApiError::NotFound(msg) => ("Resource not found", msg.clone(), None),
            ApiError::Conflict(msg) => ("Conflict", msg.clone(), None),
            ApiError::RateLimited { retry_after } => (
                "Too many requests",
                format!("Rate limit exceeded. Try again in {} seconds", retry_after),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                let detail = if cfg!(debug_assertions) {
                    msg.clone()
                } else {
                    "An error occurred while processing your request. Please try again later."
                        .to_string()
                };
                ("An internal server error occurred", detail, None)
            }
        };

        ProblemDetails {
            status: self.status().as_u16(),
            title: title.to_string(),
            detail,
            instance: None,
            errors,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::RateLimited { retry_after } => {
                write!(f, "Rate limit exceeded, retry after {}s", retry_after)
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let problem = self.to_problem();
        let status = self.status();

        let mut response = (status, Json(problem.clone())).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/problem+json"),
        );

        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(value) = header::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        // Stash the body so stamp_instance can add the request path.
        response.extensions_mut().insert(problem);

        response
    }
}

/// Middleware that stamps the request path into problem-details bodies
///
/// [`ApiError::into_response`] has no access to the request, so it leaves
/// `instance` unset and stores the body in the response extensions; this
/// layer rebuilds the body with the path filled in. Successful responses
/// pass through untouched.
pub async fn stamp_instance(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    if let Some(problem) = response.extensions_mut().remove::<ProblemDetails>() {
        let problem = ProblemDetails {
            instance: Some(path),
            ..problem
        };

        let body = match serde_json::to_vec(&problem) {
            Ok(body) => body,
            Err(_) => return response,
        };

        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_LENGTH);
        return Response::from_parts(parts, axum::body::Body::from(body));
    }

    response
}

/// Convert sqlx errors to API errors
///
/// `RowNotFound` becomes 404; constraint violations on the username unique
/// index become the duplicate-username conflict (backstop for the race
/// between the existence pre-check and the insert); everything else is
/// internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username is already taken.".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator failures into field-level validation errors
///
/// Field names are reported in the wire format's camelCase, not the Rust
/// struct's snake_case.
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<FieldError> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(field);
                errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(errors)
    }
}

/// Converts a snake_case field identifier to the wire format's camelCase
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert password hashing errors to API errors
impl From<tasknest_shared::auth::password::PasswordError> for ApiError {
    fn from(err: tasknest_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("no".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RateLimited { retry_after: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_username_conflict_maps_to_400() {
        // The original wire contract reports duplicate usernames as 400.
        assert_eq!(
            ApiError::Conflict("Username 'bob' is already taken.".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_problem_body_shape() {
        let err = ApiError::NotFound("Task does not exist".to_string());
        let problem = err.to_problem();

        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Resource not found");
        assert_eq!(problem.detail, "Task does not exist");
        assert!(problem.instance.is_none());
        assert!(problem.errors.is_none());
    }

    #[test]
    fn test_validation_problem_carries_field_errors() {
        let err = ApiError::Validation(vec![
            FieldError {
                field: "username".to_string(),
                message: "Username must be at least 3 characters".to_string(),
            },
            FieldError {
                field: "password".to_string(),
                message: "Password must be at least 6 characters".to_string(),
            },
        ]);

        let problem = err.to_problem();
        assert_eq!(problem.status, 400);
        let errors = problem.errors.expect("field errors present");
        assert_eq!(errors.len(), 2);

        let json = serde_json::to_value(&ApiError::Validation(vec![]).to_problem()).unwrap();
        assert_eq!(json["title"], "Validation error");
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = ApiError::RateLimited { retry_after: 30 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_camel_case_field_names() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("username"), "username");
        assert_eq!(camel_case("completed_date_provided"), "completedDateProvided");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_problem_serializes_camel_case() {
        let problem = ProblemDetails {
            status: 404,
            title: "Resource not found".to_string(),
            detail: "gone".to_string(),
            instance: Some("/api/tasks/123".to_string()),
            errors: None,
        };

        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["instance"], "/api/tasks/123");
        assert_eq!(json["status"], 404);
        assert!(json.get("errors").is_none());
    }
}
