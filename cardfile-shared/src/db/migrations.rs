//! Database migration runner
//!
//! Migrations live in the `migrations/` directory at the workspace root and
//! are embedded into the binary at compile time, so a deployed server carries
//! its own schema.
//!
//! # Example
//!
//! ```no_run
//! use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
//! use cardfile_shared::db::migrations::run_migrations;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig {
//!     url: "sqlite://cardfile.db".to_string(),
//!     ..Default::default()
//! };
//!
//! let pool = create_pool(config).await?;
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped; each pending one
/// runs in order and is recorded in the `_sqlx_migrations` table.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the migrations table
/// cannot be updated.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
