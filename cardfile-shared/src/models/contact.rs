//! Contact model and store operations
//!
//! This module provides the Contact model and its store operations: lookup,
//! paginated listing, create, partial update, delete, substring search, and
//! the upcoming-birthdays query.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE contacts (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     first_name TEXT NOT NULL,
//!     last_name TEXT NOT NULL,
//!     email TEXT NOT NULL,
//!     phone_number TEXT NOT NULL,
//!     birthday DATE NOT NULL,
//!     additional_info TEXT,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! Absence is not an error: lookups return `Option`, delete returns whether a
//! row was removed. Callers decide how to surface a missing contact.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A stored contact record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    /// Unique contact ID, assigned by the store on creation and immutable
    pub id: i64,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address
    pub email: String,

    /// Phone number (free-form text)
    pub phone_number: String,

    /// Birthday (calendar date; the year is ignored by the birthday query)
    pub birthday: NaiveDate,

    /// Optional free-text notes
    pub additional_info: Option<String>,

    /// When the contact was created
    pub created_at: DateTime<Utc>,

    /// When the contact was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new contact
///
/// All fields except `additional_info` are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContact {
    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone_number: String,

    /// Birthday
    pub birthday: NaiveDate,

    /// Optional free-text notes
    pub additional_info: Option<String>,
}

/// Input for partially updating an existing contact
///
/// Every field is optional; only fields that are present are applied. Fields
/// left as `None` keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContact {
    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New phone number
    pub phone_number: Option<String>,

    /// New birthday
    pub birthday: Option<NaiveDate>,

    /// New free-text notes (send an empty string to blank them)
    pub additional_info: Option<String>,
}

impl UpdateContact {
    /// Merges the supplied fields into `contact`, leaving absent ones alone.
    ///
    /// This is the whole partial-update contract: one optional field per
    /// mutable attribute, applied field by field.
    pub fn apply(self, contact: &mut Contact) {
        if let Some(first_name) = self.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            contact.last_name = last_name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone_number) = self.phone_number {
            contact.phone_number = phone_number;
        }
        if let Some(birthday) = self.birthday {
            contact.birthday = birthday;
        }
        if let Some(additional_info) = self.additional_info {
            contact.additional_info = Some(additional_info);
        }
    }
}

impl Contact {
    /// Creates a new contact in the store
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Contact creation data
    ///
    /// # Returns
    ///
    /// The newly created contact with its assigned id and timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if the insert violates a store constraint or the
    /// database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cardfile_shared::models::contact::{Contact, CreateContact};
    /// # use sqlx::SqlitePool;
    /// # use chrono::NaiveDate;
    /// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
    /// let contact = Contact::create(
    ///     &pool,
    ///     CreateContact {
    ///         first_name: "Ann".to_string(),
    ///         last_name: "Lee".to_string(),
    ///         email: "ann@example.com".to_string(),
    ///         phone_number: "+1-555-0100".to_string(),
    ///         birthday: NaiveDate::from_ymd_opt(2000, 1, 2).unwrap(),
    ///         additional_info: None,
    ///     },
    /// )
    /// .await?;
    /// println!("Created contact {}", contact.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &SqlitePool, data: CreateContact) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, last_name, email, phone_number, birthday,
                                  additional_info, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, first_name, last_name, email, phone_number, birthday,
                      additional_info, created_at, updated_at
            "#,
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.phone_number)
        .bind(data.birthday)
        .bind(data.additional_info)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(contact)
    }

    /// Finds a contact by ID
    ///
    /// # Returns
    ///
    /// The contact if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, phone_number, birthday,
                   additional_info, created_at, updated_at
            FROM contacts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(contact)
    }

    /// Lists contacts with pagination
    ///
    /// Contacts come back in id order (the store's natural order). No
    /// total-count metadata is returned.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `skip` - Number of contacts to skip
    /// * `limit` - Maximum number of contacts to return
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn list(pool: &SqlitePool, skip: i64, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let contacts = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, phone_number, birthday,
                   additional_info, created_at, updated_at
            FROM contacts
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;

        Ok(contacts)
    }

    /// Partially updates an existing contact
    ///
    /// Fetches the row, merges the supplied fields onto it (see
    /// [`UpdateContact::apply`]), and writes the merged row back inside one
    /// transaction. `updated_at` is bumped on every successful update.
    ///
    /// # Returns
    ///
    /// The updated contact if found, None if no contact has this id
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cardfile_shared::models::contact::{Contact, UpdateContact};
    /// # use sqlx::SqlitePool;
    /// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
    /// let update = UpdateContact {
    ///     phone_number: Some("+1-555-0199".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// if let Some(contact) = Contact::update(&pool, 1, update).await? {
    ///     println!("Updated {}", contact.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateContact,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, phone_number, birthday,
                   additional_info, created_at, updated_at
            FROM contacts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut contact) = contact else {
            return Ok(None);
        };

        data.apply(&mut contact);
        contact.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE contacts
            SET first_name = ?, last_name = ?, email = ?, phone_number = ?,
                birthday = ?, additional_info = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone_number)
        .bind(contact.birthday)
        .bind(&contact.additional_info)
        .bind(contact.updated_at)
        .bind(contact.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(contact))
    }

    /// Deletes a contact by ID
    ///
    /// # Returns
    ///
    /// True if a contact was deleted, false if no contact has this id
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Searches contacts by substring
    ///
    /// Performs a case-insensitive substring match of `query` against first
    /// name, last name, or email. An empty query matches every contact, which
    /// callers should treat as intentional list-all behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        let contacts = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, phone_number, birthday,
                   additional_info, created_at, updated_at
            FROM contacts
            WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR email LIKE ?1
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

        Ok(contacts)
    }

    /// Returns contacts whose birthday falls within the next week
    ///
    /// The window is `today` through seven days later inclusive: 8 calendar
    /// days. Each target date is computed as a real calendar date and then
    /// decomposed into a month/day key, so a window spanning a month or year
    /// boundary (late December into January) matches correctly. The birthday's
    /// year is ignored.
    ///
    /// February 29 birthdays are celebrated on February 28 in years without a
    /// leap day: whenever the window contains Feb 28 of a non-leap year, the
    /// Feb 29 key is included in the match set.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `today` - Start of the window; callers pass the current date
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn upcoming_birthdays(
        pool: &SqlitePool,
        today: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let keys = birthday_keys(today);

        // One placeholder per month/day key; the key count varies only when
        // the Feb 29 rule adds an extra entry.
        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, first_name, last_name, email, phone_number, birthday,
                   additional_info, created_at, updated_at
            FROM contacts
            WHERE strftime('%m-%d', birthday) IN ({placeholders})
            ORDER BY id
            "#
        );

        let mut query = sqlx::query_as::<_, Contact>(&sql);
        for key in &keys {
            query = query.bind(key);
        }

        let contacts = query.fetch_all(pool).await?;

        Ok(contacts)
    }
}

/// Computes the month/day keys ("MM-DD") covered by the 8-day window starting
/// at `today`, applying the Feb 29 policy described on
/// [`Contact::upcoming_birthdays`].
fn birthday_keys(today: NaiveDate) -> Vec<String> {
    let mut keys = Vec::with_capacity(9);

    for offset in 0..8 {
        let day = today + Days::new(offset);
        keys.push(day.format("%m-%d").to_string());

        if day.month() == 2 && day.day() == 28 && !has_leap_day(day.year()) {
            keys.push("02-29".to_string());
        }
    }

    keys
}

fn has_leap_day(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birthday_keys_plain_window() {
        let keys = birthday_keys(date(2024, 6, 10));
        assert_eq!(
            keys,
            vec![
                "06-10", "06-11", "06-12", "06-13", "06-14", "06-15", "06-16", "06-17"
            ]
        );
    }

    #[test]
    fn test_birthday_keys_year_rollover() {
        let keys = birthday_keys(date(2024, 12, 28));
        assert_eq!(
            keys,
            vec![
                "12-28", "12-29", "12-30", "12-31", "01-01", "01-02", "01-03", "01-04"
            ]
        );
    }

    #[test]
    fn test_birthday_keys_non_leap_year_includes_feb_29() {
        // 2025 has no Feb 29; the window covering Feb 28 picks it up anyway.
        let keys = birthday_keys(date(2025, 2, 22));
        assert!(keys.contains(&"02-28".to_string()));
        assert!(keys.contains(&"02-29".to_string()));
        assert_eq!(keys.len(), 9);
    }

    #[test]
    fn test_birthday_keys_leap_year_has_no_extra_key() {
        // 2024 has a real Feb 29, so it appears exactly once.
        let keys = birthday_keys(date(2024, 2, 25));
        assert_eq!(keys.iter().filter(|k| *k == "02-29").count(), 1);
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_update_contact_apply_merges_only_present_fields() {
        let mut contact = Contact {
            id: 1,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            phone_number: "+1-555-0100".to_string(),
            birthday: date(2000, 1, 2),
            additional_info: Some("met at conference".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        UpdateContact {
            phone_number: Some("+1-555-0199".to_string()),
            ..Default::default()
        }
        .apply(&mut contact);

        assert_eq!(contact.phone_number, "+1-555-0199");
        assert_eq!(contact.first_name, "Ann");
        assert_eq!(contact.email, "ann@example.com");
        assert_eq!(contact.additional_info.as_deref(), Some("met at conference"));
    }

    #[test]
    fn test_update_contact_default_is_a_no_op() {
        let mut contact = Contact {
            id: 7,
            first_name: "Bo".to_string(),
            last_name: "Nguyen".to_string(),
            email: "bo@example.com".to_string(),
            phone_number: "555".to_string(),
            birthday: date(1990, 7, 14),
            additional_info: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        UpdateContact::default().apply(&mut contact);

        assert_eq!(contact.first_name, "Bo");
        assert_eq!(contact.birthday, date(1990, 7, 14));
        assert!(contact.additional_info.is_none());
    }
}
