//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
/// Structures holding AsyncDbPool can derive Clone without additional Arc wrapping.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool from the `[database]` settings.
///
/// # Errors
///
/// Returns `AppError::ConnectionPool` if the pool cannot be built, e.g. when
/// the initial connections cannot be established within the timeout.
///
/// # Example
///
/// ```ignore
/// let pool = establish_async_connection_pool(&settings.database).await?;
/// let repo = DeviceRepository::new(pool);
/// ```
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool initialized"
    );

    Ok(pool)
}
