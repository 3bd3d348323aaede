/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Correlation IDs and request/response logging
/// - Rate limiting

pub mod correlation;
pub mod rate_limit;
