//! Configuration management for the API server
//!
//! This module loads configuration from environment variables and provides
//! a type-safe configuration struct.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
//! - `DATABASE_URL`: SQLite connection string (default: sqlite://cardfile.db)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `RATE_LIMIT_PER_MINUTE`: Request ceiling per client address on limited
//!   routes (default: 5)
//! - `RUST_LOG`: Log level (default: info)
//!
//! # Example
//!
//! ```no_run
//! use cardfile_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per minute per client address on limited routes
    pub requests_per_minute: u32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://cardfile.db".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let requests_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        if requests_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be at least 1");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
