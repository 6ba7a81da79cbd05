//! # Cardfile Shared Library
//!
//! This crate contains the store layer shared between the Cardfile API server
//! and supporting tooling: database pooling, migrations, and the persistent
//! models with their query operations.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool management and migrations
//! - `models`: Database models and their store operations

pub mod db;
pub mod models;

/// Current version of the cardfile shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
