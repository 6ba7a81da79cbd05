//! User model and the avatar update operation
//!
//! Users are looked up by email (case-insensitive via `COLLATE NOCASE`).
//! Unlike the contact operations, a missing user here is an explicit
//! [`UserError::NotFound`] failure rather than a returned absence: the avatar
//! flow is invoked by an external collaborator that must handle the failure.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     email TEXT NOT NULL UNIQUE COLLATE NOCASE,
//!     avatar_url TEXT,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Error type for user store operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// No user exists with the given email
    #[error("User not found: {0}")]
    NotFound(String),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Email address (unique, case-insensitive)
    pub email: String,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user in the store
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database connection fails
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, avatar_url, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, email, avatar_url, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.avatar_url)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, avatar_url, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates a user's avatar URL, looking the user up by email
    ///
    /// # Returns
    ///
    /// The updated user
    ///
    /// # Errors
    ///
    /// - [`UserError::NotFound`] if no user has this email
    /// - [`UserError::Database`] if the database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cardfile_shared::models::user::User;
    /// # use sqlx::SqlitePool;
    /// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    /// let user =
    ///     User::update_avatar(&pool, "ann@example.com", "https://cdn.example.com/a.png").await?;
    /// println!("Avatar set for user {}", user.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update_avatar(
        pool: &SqlitePool,
        email: &str,
        avatar_url: &str,
    ) -> Result<Self, UserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET avatar_url = ?, updated_at = ?
            WHERE email = ?
            RETURNING id, email, avatar_url, created_at, updated_at
            "#,
        )
        .bind(avatar_url)
        .bind(Utc::now())
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| UserError::NotFound(email.to_string()))?;

        Ok(user)
    }
}
