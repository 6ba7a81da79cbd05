//! Database models for Cardfile
//!
//! This module contains the persistent models and their store operations.
//! Each operation is a single round trip against the record store; no state
//! is held in memory between calls.
//!
//! # Models
//!
//! - `contact`: Contact records with CRUD, search, and the upcoming-birthdays
//!   query
//! - `user`: User accounts and the avatar update operation
//!
//! # Example
//!
//! ```no_run
//! use cardfile_shared::models::contact::{Contact, CreateContact};
//! use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let contact = Contact::create(
//!     &pool,
//!     CreateContact {
//!         first_name: "Ann".to_string(),
//!         last_name: "Lee".to_string(),
//!         email: "ann@example.com".to_string(),
//!         phone_number: "+1-555-0100".to_string(),
//!         birthday: NaiveDate::from_ymd_opt(2000, 1, 2).unwrap(),
//!         additional_info: None,
//!     },
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod contact;
pub mod user;
