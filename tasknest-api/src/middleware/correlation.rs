/// Correlation ID middleware
///
/// This module provides middleware that gives every request an opaque
/// correlation ID for traceability: the ID is taken from the incoming
/// `X-Correlation-Id` header when present, generated otherwise, echoed on
/// the response, and included in the request/response log lines.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use tasknest_api::middleware::correlation::CorrelationLayer;
///
/// let app: Router = Router::new()
///     .layer(CorrelationLayer::new());
/// ```

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    response::Response,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the correlation ID
pub static CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Correlation ID middleware layer
#[derive(Clone, Default)]
pub struct CorrelationLayer;

impl CorrelationLayer {
    /// Creates a new correlation layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationMiddleware { inner }
    }
}

/// Correlation ID middleware service
#[derive(Clone)]
pub struct CorrelationMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let correlation_id = ensure_correlation_id(&request);

        let method = request.method().clone();
        let path_with_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| request.uri().path().to_string());

        tracing::info!(
            %method,
            path = %path_with_query,
            correlation_id = %correlation_id,
            "Incoming request"
        );

        let started_at = std::time::Instant::now();
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;

            if let Ok(value) = HeaderValue::from_str(&correlation_id) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER.clone(), value);
            }

            tracing::info!(
                %method,
                path = %path_with_query,
                status = response.status().as_u16(),
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                correlation_id = %correlation_id,
                "Completed request"
            );

            Ok(response)
        })
    }
}

/// Returns the request's correlation ID, generating one if absent
fn ensure_correlation_id(request: &Request) -> String {
    request
        .headers()
        .get(&CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
