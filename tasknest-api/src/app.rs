/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = tasknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error,
    middleware::{
        correlation::CorrelationLayer,
        rate_limit::{rate_limit_layer, FixedWindowLimiter, RateLimit},
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Process-wide rate limiter
    pub rate_limiter: FixedWindowLimiter,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let rate_limiter = FixedWindowLimiter::new(RateLimit::per_minute(
            config.rate_limit.requests_per_minute,
            config.rate_limit.queue_limit,
        ));

        Self {
            db,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check
/// ├── /api/
/// │   ├── /users/                      # User endpoints
/// │   │   ├── POST  /                  # Create user
/// │   │   └── POST  /login             # Login (no token issued)
/// │   └── /tasks/                      # Task + subtask endpoints
/// │       ├── POST  /                  # Create task
/// │       ├── GET   /user/:user_id     # List + filter + paginate
/// │       ├── GET   /:task_id          # Fetch task with subtasks
/// │       ├── PATCH /:task_id          # Partial update
/// │       ├── POST  /delete            # Delete (cascades)
/// │       ├── POST  /subtask           # Create subtask
/// │       ├── PATCH /subtask/:id       # Partial update
/// │       └── POST  /subtask/delete    # Delete subtask
/// └── /*                               # Static front-end, SPA fallback
/// ```
///
/// # Middleware Stack
///
/// Applied outermost to innermost:
/// 1. Correlation IDs + request/response logging
/// 2. CORS
/// 3. Problem-details instance stamping
/// 4. Rate limiting (process-wide, per client address)
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/", post(routes::users::create_user))
        .route("/login", post(routes::users::login));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/user/:user_id", get(routes::tasks::list_tasks))
        .route(
            "/:task_id",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route("/delete", post(routes::tasks::delete_task))
        .route("/subtask", post(routes::subtasks::create_subtask))
        .route("/subtask/:subtask_id", patch(routes::subtasks::update_subtask))
        .route("/subtask/delete", post(routes::subtasks::delete_subtask));

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes);

    // Static front-end with SPA fallback: unknown paths serve the index
    // document so client-side routing works on refresh.
    let static_dir = state.config.api.static_dir.clone();
    let index_file = Path::new(&static_dir).join("index.html");
    let spa = ServeDir::new(&static_dir).not_found_service(ServeFile::new(index_file));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback_service(spa)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn(error::stamp_instance))
        .layer(build_cors(&state.config))
        .layer(CorrelationLayer::new())
        .with_state(state)
}

/// Configures CORS from the allowed-origin list
///
/// `*` switches to the permissive development policy; otherwise only the
/// configured front-end origins are allowed.
fn build_cors(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-correlation-id"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
