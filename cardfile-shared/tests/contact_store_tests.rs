//! Integration tests for the contact store
//!
//! These run against a fresh in-memory SQLite database with the real
//! migrations applied, so they exercise the actual queries end-to-end without
//! any HTTP harness.

use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
use cardfile_shared::models::contact::{Contact, CreateContact, UpdateContact};
use chrono::NaiveDate;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    let pool = create_pool(DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        // In-memory databases live per-connection; a larger pool would hand
        // out empty databases.
        max_connections: 1,
        ..Default::default()
    })
    .await
    .unwrap();

    cardfile_shared::db::migrations::run_migrations(&pool)
        .await
        .unwrap();

    pool
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture(first: &str, last: &str, email: &str, birthday: NaiveDate) -> CreateContact {
    CreateContact {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone_number: "+1-555-0100".to_string(),
        birthday,
        additional_info: None,
    }
}

#[tokio::test]
async fn test_create_assigns_id_and_round_trips() {
    let pool = test_pool().await;

    let created = Contact::create(
        &pool,
        CreateContact {
            additional_info: Some("college roommate".to_string()),
            ..fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2))
        },
    )
    .await
    .unwrap();

    assert!(created.id > 0);

    let fetched = Contact::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(fetched.first_name, "Ann");
    assert_eq!(fetched.last_name, "Lee");
    assert_eq!(fetched.email, "a@x.com");
    assert_eq!(fetched.birthday, date(2000, 1, 2));
    assert_eq!(fetched.additional_info.as_deref(), Some("college roommate"));
}

#[tokio::test]
async fn test_find_by_id_absent_returns_none() {
    let pool = test_pool().await;

    let found = Contact::find_by_id(&pool, 9999).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_respects_skip_and_limit() {
    let pool = test_pool().await;

    for i in 0..5 {
        Contact::create(
            &pool,
            fixture(
                &format!("First{i}"),
                "Last",
                &format!("c{i}@example.com"),
                date(1990, 1, 1),
            ),
        )
        .await
        .unwrap();
    }

    let page = Contact::list(&pool, 1, 2).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].first_name, "First1");
    assert_eq!(page[1].first_name, "First2");

    let tail = Contact::list(&pool, 4, 10).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].first_name, "First4");
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let pool = test_pool().await;

    let created = Contact::create(
        &pool,
        CreateContact {
            additional_info: Some("notes".to_string()),
            ..fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2))
        },
    )
    .await
    .unwrap();

    let updated = Contact::update(
        &pool,
        created.id,
        UpdateContact {
            email: Some("ann.lee@x.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.email, "ann.lee@x.com");

    // Everything else is untouched.
    let fetched = Contact::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(fetched.email, "ann.lee@x.com");
    assert_eq!(fetched.first_name, "Ann");
    assert_eq!(fetched.last_name, "Lee");
    assert_eq!(fetched.phone_number, created.phone_number);
    assert_eq!(fetched.birthday, created.birthday);
    assert_eq!(fetched.additional_info.as_deref(), Some("notes"));
}

#[tokio::test]
async fn test_update_absent_returns_none() {
    let pool = test_pool().await;

    let result = Contact::update(
        &pool,
        424242,
        UpdateContact {
            first_name: Some("Nobody".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_delete_succeeds_exactly_once() {
    let pool = test_pool().await;

    let created = Contact::create(&pool, fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2)))
        .await
        .unwrap();

    assert!(Contact::delete(&pool, created.id).await.unwrap());
    assert!(!Contact::delete(&pool, created.id).await.unwrap());
    assert!(Contact::find_by_id(&pool, created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_absent_returns_false() {
    let pool = test_pool().await;

    assert!(!Contact::delete(&pool, 31337).await.unwrap());
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring_across_fields() {
    let pool = test_pool().await;

    Contact::create(&pool, fixture("Annabel", "Smith", "as@x.com", date(1991, 3, 1)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Bob", "McCann", "bob@x.com", date(1992, 4, 2)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Carol", "Jones", "anne@y.com", date(1993, 5, 3)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Dave", "Brown", "dave@z.com", date(1994, 6, 4)))
        .await
        .unwrap();

    // "ann" hits first name, last name, and email independently (OR).
    let hits = Contact::search(&pool, "ANN").await.unwrap();
    let emails: Vec<&str> = hits.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, vec!["as@x.com", "bob@x.com", "anne@y.com"]);
}

#[tokio::test]
async fn test_search_empty_query_matches_everything() {
    let pool = test_pool().await;

    Contact::create(&pool, fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Bob", "Ray", "b@x.com", date(2001, 2, 3)))
        .await
        .unwrap();

    let hits = Contact::search(&pool, "").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_search_no_match_returns_empty() {
    let pool = test_pool().await;

    Contact::create(&pool, fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2)))
        .await
        .unwrap();

    let hits = Contact::search(&pool, "zzz-no-such-contact").await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_upcoming_birthdays_within_one_month() {
    let pool = test_pool().await;

    let inside = Contact::create(&pool, fixture("In", "Window", "in@x.com", date(1985, 6, 15)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Out", "Side", "out@x.com", date(1985, 6, 25)))
        .await
        .unwrap();

    let hits = Contact::upcoming_birthdays(&pool, date(2024, 6, 10)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, inside.id);
}

#[tokio::test]
async fn test_upcoming_birthdays_spans_year_boundary() {
    let pool = test_pool().await;

    // Window for 2024-12-28 covers (12,28)..(12,31) and (1,1)..(1,4).
    let dec = Contact::create(&pool, fixture("Dec", "Born", "dec@x.com", date(1970, 12, 31)))
        .await
        .unwrap();
    let jan = Contact::create(&pool, fixture("Jan", "Born", "jan@x.com", date(1988, 1, 4)))
        .await
        .unwrap();
    Contact::create(&pool, fixture("Late", "Jan", "late@x.com", date(1988, 1, 5)))
        .await
        .unwrap();

    let hits = Contact::upcoming_birthdays(&pool, date(2024, 12, 28)).await.unwrap();
    let ids: Vec<i64> = hits.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![dec.id, jan.id]);
}

#[tokio::test]
async fn test_upcoming_birthdays_ann_lee_scenario() {
    let pool = test_pool().await;

    let ann = Contact::create(&pool, fixture("Ann", "Lee", "a@x.com", date(2000, 1, 2)))
        .await
        .unwrap();

    // Jan 2 falls inside the 8-day window starting 2023-12-30.
    let hits = Contact::upcoming_birthdays(&pool, date(2023, 12, 30)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ann.id);
}

#[tokio::test]
async fn test_upcoming_birthdays_feb_29_in_leap_year() {
    let pool = test_pool().await;

    let leapling = Contact::create(&pool, fixture("Leap", "Day", "leap@x.com", date(1996, 2, 29)))
        .await
        .unwrap();

    // 2024 is a leap year; Feb 29 is a real date in the window.
    let hits = Contact::upcoming_birthdays(&pool, date(2024, 2, 25)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, leapling.id);
}

#[tokio::test]
async fn test_upcoming_birthdays_feb_29_in_non_leap_year() {
    let pool = test_pool().await;

    let leapling = Contact::create(&pool, fixture("Leap", "Day", "leap@x.com", date(1996, 2, 29)))
        .await
        .unwrap();

    // 2025 has no Feb 29; the leapling is celebrated on Feb 28 instead of
    // being dropped.
    let hits = Contact::upcoming_birthdays(&pool, date(2025, 2, 22)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, leapling.id);

    // Outside the window they are not matched.
    let misses = Contact::upcoming_birthdays(&pool, date(2025, 3, 5)).await.unwrap();
    assert!(misses.is_empty());
}
