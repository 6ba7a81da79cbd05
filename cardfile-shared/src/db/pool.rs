//! Database connection pool management
//!
//! This module provides the SQLite connection pool used by every store
//! operation. Each operation checks a connection out of the pool for the
//! duration of the call and returns it unconditionally when the guard drops.
//!
//! # Example
//!
//! ```no_run
//! use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: "sqlite://cardfile.db".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!
//!     let row: (i64,) = sqlx::query_as("SELECT ?")
//!         .bind(42i64)
//!         .fetch_one(&pool)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the database connection pool
///
/// All timeouts are specified in seconds for ease of configuration from
/// environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite://cardfile.db" or "sqlite::memory:")
    pub url: String,

    /// Maximum number of connections in the pool
    ///
    /// Default: 10. In-memory databases must use 1, since every connection to
    /// `sqlite::memory:` opens a separate database.
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    ///
    /// Default: 1. Keeping a connection warm avoids reopening the file on
    /// every request.
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    ///
    /// Default: 30 seconds
    pub connect_timeout_seconds: u64,

    /// How long a connection can remain idle before being closed (seconds)
    ///
    /// Default: Some(600) (10 minutes). None = connections never closed due
    /// to idle time.
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
        }
    }
}

/// Creates and initializes a SQLite connection pool
///
/// This function:
/// 1. Creates a pool with the specified configuration (creating the database
///    file if it does not exist yet)
/// 2. Performs a health check to verify the database is usable
/// 3. Returns an error if the database cannot be opened
///
/// # Errors
///
/// Returns an error if:
/// - The database URL is invalid
/// - The database file cannot be created or opened
/// - The health check fails
///
/// # Example
///
/// ```no_run
/// use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig {
///     url: "sqlite://cardfile.db".to_string(),
///     ..Default::default()
/// };
///
/// let pool = create_pool(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_seconds = config.connect_timeout_seconds,
        "Creating database connection pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds));

    if let Some(idle_timeout) = config.idle_timeout_seconds {
        pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
        debug!(idle_timeout_seconds = idle_timeout, "Set idle timeout");
    }

    let pool = pool_options.connect_with(connect_options).await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// Executes a simple query to verify the database is reachable and responding.
///
/// # Errors
///
/// Returns an error if the health check query fails
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Gracefully closes the connection pool
///
/// This should be called during application shutdown to ensure all
/// connections are properly closed and resources are released.
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}
