/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations run on first connect)
/// - Router construction with a test configuration
/// - JSON request/response helpers driving the router directly
///
/// Tests need a PostgreSQL database named by `TEST_DATABASE_URL`; when the
/// variable is unset, each test prints a notice and passes without running.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::{ApiConfig, Config, DatabaseConfig, RateLimitConfig};
use tower::ServiceExt as _;
use uuid::Uuid;

/// Test context containing the database pool and the app router
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context, or None when no test database is
    /// configured
    pub async fn new() -> Option<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        let db = PgPool::connect(&url)
            .await
            .expect("connect to TEST_DATABASE_URL");

        // Path relative to the tasknest-api crate root
        sqlx::migrate!("../tasknest-shared/migrations")
            .run(&db)
            .await
            .expect("run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                static_dir: "static".to_string(),
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            rate_limit: RateLimitConfig {
                // All test requests share one client bucket (no connection
                // info when driving the router directly), so keep the
                // limiter out of the way unless a test opts in.
                requests_per_minute: 1_000_000,
                queue_limit: 10,
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(TestContext { db, app })
    }

    /// Sends a request with a JSON body and returns (status, parsed body)
    pub async fn request_json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request_json("POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request_json("PATCH", uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request_json("GET", uri, None).await
    }
}

/// Creates a user with a unique username and returns (user_id, username)
pub async fn create_test_user(ctx: &TestContext) -> (String, String) {
    let username = format!("user-{}", Uuid::new_v4());

    let (status, body) = ctx
        .post(
            "/api/users",
            json!({
                "role": "user",
                "firstName": "Test",
                "lastName": "User",
                "username": username,
                "password": "secret123"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "create user failed: {}", body);
    (body["userId"].as_str().unwrap().to_string(), username)
}

/// Creates a task for the given user and returns its ID
pub async fn create_test_task(ctx: &TestContext, user_id: &str, name: &str) -> String {
    let (status, body) = ctx
        .post(
            "/api/tasks",
            json!({
                "userId": user_id,
                "taskName": name,
                "description": format!("{} description", name),
                "createdBy": user_id
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
    body["taskId"].as_str().unwrap().to_string()
}

/// Creates a subtask under the given task and returns its ID
pub async fn create_test_subtask(ctx: &TestContext, task_id: &str, description: &str) -> String {
    let (status, body) = ctx
        .post(
            "/api/tasks/subtask",
            json!({
                "taskId": task_id,
                "description": description
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "create subtask failed: {}", body);
    body["subtaskId"].as_str().unwrap().to_string()
}
