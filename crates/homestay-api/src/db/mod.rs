//! # Database Persistence Layer
//!
//! Optional Postgres persistence via SQLx.
//!
//! When `DATABASE_URL` is set, every create and update is written through
//! to a single `records` table (one JSONB document per record, keyed by
//! collection and id) and the in-memory stores are hydrated from it at
//! startup. When absent, the API runs in-memory only, which is what the
//! tests use.

pub mod records;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 Records will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
