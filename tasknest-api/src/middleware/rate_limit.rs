/// Rate limiting middleware
///
/// This module implements a process-wide fixed-window rate limiter keyed by
/// client address. Each client gets a fixed number of permits per one-minute
/// window; when a window is exhausted, a short queue of callers is parked
/// until the next window opens (oldest first, via pre-reserved permits), and
/// anything beyond the queue is rejected with 429.
///
/// # Defaults
///
/// - 60 requests/minute per client address
/// - Queue of 10 parked callers
///
/// State lives in-process; there is no shared mutable state beyond this
/// map and the database pool, so a single mutex-guarded HashMap suffices.
///
/// # Headers
///
/// Rejected requests carry `Retry-After` with the seconds until the next
/// window opens.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Fixed-window rate limit configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Permits per window
    pub permit_limit: u32,

    /// Window length
    pub window: Duration,

    /// Callers parked waiting for the next window before rejecting
    pub queue_limit: u32,
}

impl RateLimit {
    /// One-minute window with the given per-minute permit count
    pub fn per_minute(permit_limit: u32, queue_limit: u32) -> Self {
        RateLimit {
            permit_limit,
            window: Duration::from_secs(60),
            queue_limit,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit::per_minute(60, 10)
    }
}

/// Per-client window accounting
#[derive(Debug)]
struct WindowState {
    /// When the current window opened
    window_start: Instant,

    /// Permits consumed in the current window
    used: u32,

    /// Permits pre-reserved by parked callers for the next window
    reserved: u32,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed immediately
    Allowed,

    /// Park until `ready_at` (the start of the next window), then proceed;
    /// the permit is already reserved
    Queued { ready_at: Instant },

    /// Reject with 429
    Rejected { retry_after_secs: u64 },
}

/// Process-wide fixed-window rate limiter keyed by client address
#[derive(Clone)]
pub struct FixedWindowLimiter {
    limit: RateLimit,
    states: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl FixedWindowLimiter {
    /// Creates a new limiter with the given configuration
    pub fn new(limit: RateLimit) -> Self {
        FixedWindowLimiter {
            limit,
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Checks whether a request from `key` may proceed at `now`
    ///
    /// Time is passed in explicitly so the accounting is testable without a
    /// clock.
    pub fn check(&self, key: &str, now: Instant) -> Decision {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());

        let state = states.entry(key.to_string()).or_insert(WindowState {
            window_start: now,
            used: 0,
            reserved: 0,
        });

        // Roll the window forward; reserved permits from parked callers
        // carry into the window they reserved.
        while now >= state.window_start + self.limit.window {
            state.window_start += self.limit.window;
            state.used = state.reserved;
            state.reserved = 0;
        }

        if state.used < self.limit.permit_limit {
            state.used += 1;
            return Decision::Allowed;
        }

        let window_end = state.window_start + self.limit.window;

        if state.reserved < self.limit.queue_limit {
            state.reserved += 1;
            return Decision::Queued {
                ready_at: window_end,
            };
        }

        let retry_after_secs = window_end
            .saturating_duration_since(now)
            .as_secs()
            .max(1);

        Decision::Rejected { retry_after_secs }
    }
}

/// Rate limiting middleware
///
/// Checks the limiter before processing a request. Queued callers are held
/// here until their reserved window opens; rejected callers get 429 with
/// `Retry-After`.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request);

    match state.rate_limiter.check(&key, Instant::now()) {
        Decision::Allowed => {}
        Decision::Queued { ready_at } => {
            tracing::debug!(client = %key, "Rate limit window exhausted, parking request");
            tokio::time::sleep_until(ready_at).await;
        }
        Decision::Rejected { retry_after_secs } => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            return Err(ApiError::RateLimited {
                retry_after: retry_after_secs,
            });
        }
    }

    Ok(next.run(request).await)
}

/// Extracts the client address used as the rate limit key
///
/// Falls back to a shared bucket when the connection info extension is
/// absent (e.g. requests driven directly through the router in tests).
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
