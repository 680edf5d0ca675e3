//! # Bearer Token Authentication
//!
//! A single operator token guards every `/v1` route. When no token is
//! configured, authentication is disabled (development mode) and every
//! request passes through.
//!
//! ```text
//! Authorization: Bearer {token}
//! ```

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ, performs a dummy comparison so that timing does not
/// depend on whether the lengths matched.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject requests without a valid `Authorization: Bearer` header.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) if constant_time_token_eq(provided, &expected) => {
                next.run(request).await
            }
            Some(_) => {
                tracing::warn!("authentication failed: invalid bearer token");
                unauthorized("invalid bearer token")
            }
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized("missing authorization header")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}
