//! Contact endpoints
//!
//! This module maps the HTTP surface onto the contact store operations:
//!
//! - `POST   /contacts`            - Create contact
//! - `GET    /contacts`            - List contacts (`?skip=&limit=`)
//! - `GET    /contacts/:id`        - Get contact by id
//! - `PUT    /contacts/:id`        - Partial update
//! - `DELETE /contacts/:id`        - Delete contact
//! - `GET    /contacts/search`     - Case-insensitive substring search
//! - `GET    /contacts/birthdays`  - Contacts with a birthday in the next week
//!
//! Store absences become 404s here; the store itself never raises for a
//! missing contact.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cardfile_shared::models::contact::{Contact, CreateContact, UpdateContact};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create contact request
///
/// All fields except `additional_info` are required; store-level constraints
/// beyond these checks surface as 409/500 from the persistence layer.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    /// First name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    /// Last name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Phone number
    #[validate(length(min = 1, max = 32, message = "Phone number must be 1-32 characters"))]
    pub phone_number: String,

    /// Birthday (YYYY-MM-DD)
    pub birthday: NaiveDate,

    /// Optional free-text notes
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub additional_info: Option<String>,
}

/// Partial update request
///
/// Any subset of fields may be supplied; absent fields keep their stored
/// values. `null` counts as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateContactRequest {
    /// New first name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    /// New last name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New phone number
    #[validate(length(min = 1, max = 32, message = "Phone number must be 1-32 characters"))]
    pub phone_number: Option<String>,

    /// New birthday (YYYY-MM-DD)
    pub birthday: Option<NaiveDate>,

    /// New free-text notes (empty string blanks them)
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub additional_info: Option<String>,
}

/// Pagination parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Number of contacts to skip
    #[serde(default)]
    pub skip: i64,

    /// Maximum number of contacts to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Query parameter for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to match; empty or missing matches every contact
    #[serde(default)]
    pub query: String,
}

/// Delete confirmation response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteContactResponse {
    /// Confirmation message
    pub message: String,
}

/// Create contact endpoint handler
///
/// # Endpoint
///
/// ```text
/// POST /contacts
/// Content-Type: application/json
///
/// {
///   "first_name": "Ann",
///   "last_name": "Lee",
///   "email": "ann@example.com",
///   "phone_number": "+1-555-0100",
///   "birthday": "2000-01-02",
///   "additional_info": "college roommate"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `429 Too Many Requests`: Rate limit exceeded
pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    req.validate()?;

    let contact = Contact::create(
        &state.db,
        CreateContact {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone_number: req.phone_number,
            birthday: req.birthday,
            additional_info: req.additional_info,
        },
    )
    .await?;

    tracing::info!(contact_id = contact.id, "Contact created");

    Ok((StatusCode::CREATED, Json(contact)))
}

/// List contacts endpoint handler
///
/// Returns contacts in store order, honoring `?skip=` and `?limit=`
/// (defaults 0 and 100). No total-count metadata is included.
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Contact>>> {
    let skip = params.skip.max(0);
    let limit = params.limit.max(0);

    let contacts = Contact::list(&state.db, skip, limit).await?;

    Ok(Json(contacts))
}

/// Get contact endpoint handler
///
/// # Errors
///
/// - `404 Not Found`: No contact has this id
/// - `429 Too Many Requests`: Rate limit exceeded
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Contact>> {
    let contact = Contact::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(Json(contact))
}

/// Update contact endpoint handler
///
/// Applies a partial update: only fields present in the body change.
///
/// # Errors
///
/// - `404 Not Found`: No contact has this id
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateContactRequest>,
) -> ApiResult<Json<Contact>> {
    req.validate()?;

    let contact = Contact::update(
        &state.db,
        id,
        UpdateContact {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone_number: req.phone_number,
            birthday: req.birthday,
            additional_info: req.additional_info,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    tracing::info!(contact_id = contact.id, "Contact updated");

    Ok(Json(contact))
}

/// Delete contact endpoint handler
///
/// Returns a confirmation message rather than the deleted entity.
///
/// # Errors
///
/// - `404 Not Found`: No contact has this id
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteContactResponse>> {
    let deleted = Contact::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    tracing::info!(contact_id = id, "Contact deleted");

    Ok(Json(DeleteContactResponse {
        message: "Contact deleted successfully".to_string(),
    }))
}

/// Search contacts endpoint handler
///
/// Case-insensitive substring match against first name, last name, or email.
/// An empty or missing `query` matches every contact; that is list-all
/// behavior, not an error.
pub async fn search_contacts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = Contact::search(&state.db, &params.query).await?;

    Ok(Json(contacts))
}

/// Upcoming birthdays endpoint handler
///
/// Returns contacts whose birthday (month and day) falls within today
/// through seven days from now.
pub async fn upcoming_birthdays(State(state): State<AppState>) -> ApiResult<Json<Vec<Contact>>> {
    let today = Local::now().date_naive();

    let contacts = Contact::upcoming_birthdays(&state.db, today).await?;

    Ok(Json(contacts))
}
