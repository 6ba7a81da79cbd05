//! Database layer for Cardfile
//!
//! This module provides database connection pooling and migrations.
//!
//! # Modules
//!
//! - `pool`: SQLite connection pool management with health checks
//! - `migrations`: Database migration runner
//! - Models are in the `models` module at crate root level
//!
//! # Example
//!
//! ```no_run
//! use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
//! use cardfile_shared::db::migrations::run_migrations;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
