//! # Request Metrics
//!
//! In-process request and error counters, shared through request
//! extensions and read back by the dashboard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared metrics state.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Requests served so far.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests that ended in a 4xx or 5xx.
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(status = status.as_u16(), "request ended in error");
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_app(metrics: ApiMetrics) -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/fail", get(|| async { StatusCode::CONFLICT }))
            .layer(from_fn(metrics_middleware))
            .layer(axum::Extension(metrics))
    }

    #[tokio::test]
    async fn counts_requests_and_errors() {
        let metrics = ApiMetrics::new();
        for uri in ["/ok", "/ok", "/fail", "/fail"] {
            test_app(metrics.clone())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
        }
        assert_eq!(metrics.requests(), 4);
        assert_eq!(metrics.errors(), 2);
    }
}
