//! Middleware modules for the API server
//!
//! This module contains custom middleware for:
//! - Per-client rate limiting

pub mod rate_limit;
