//! # HTTP Middleware
//!
//! Request counting and request tracing, layered onto the `/v1` router.

pub mod metrics;
pub mod tracing_layer;
