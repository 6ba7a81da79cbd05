//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `contacts`: Contact CRUD, search, and upcoming-birthdays endpoints

pub mod contacts;
pub mod health;
