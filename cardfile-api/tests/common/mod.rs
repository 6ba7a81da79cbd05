//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory database with the real migrations applied
//! - The real router, driven directly through the tower Service interface
//! - Request/response helpers

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use cardfile_api::app::{build_router, AppState};
use cardfile_api::config::{ApiConfig, Config, DatabaseConfig, RateLimitConfig};
use cardfile_shared::db::migrations::run_migrations;
use cardfile_shared::db::pool::create_pool;
use serde_json::json;
use sqlx::SqlitePool;
use tower::Service as _;

/// Test context containing the app and its backing database
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
}

impl TestContext {
    /// Creates a test context with a rate limit high enough that ordinary
    /// tests never trip it. Rate-limit tests use [`TestContext::with_rate_limit`].
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_rate_limit(10_000).await
    }

    /// Creates a test context with a specific per-client rate limit
    pub async fn with_rate_limit(requests_per_minute: u32) -> anyhow::Result<Self> {
        let db = create_pool(cardfile_shared::db::pool::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            // In-memory databases live per-connection.
            max_connections: 1,
            ..Default::default()
        })
        .await?;

        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute,
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().call(request).await.unwrap()
    }
}

/// Builds a JSON contact creation body
pub fn contact_body(first: &str, last: &str, email: &str, birthday: &str) -> serde_json::Value {
    json!({
        "first_name": first,
        "last_name": last,
        "email": email,
        "phone_number": "+1-555-0100",
        "birthday": birthday,
    })
}

/// Builds a JSON POST /contacts request, optionally attributed to a client
/// address via X-Forwarded-For
pub fn create_request(body: &serde_json::Value, client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/contacts")
        .header("content-type", "application/json");

    if let Some(addr) = client {
        builder = builder.header("x-forwarded-for", addr);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a bodyless request, optionally attributed to a client address
pub fn get_request(method: &str, uri: &str, client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(addr) = client {
        builder = builder.header("x-forwarded-for", addr);
    }

    builder.body(Body::empty()).unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates a contact through the API and returns its JSON representation
pub async fn create_contact(
    ctx: &TestContext,
    first: &str,
    last: &str,
    email: &str,
    birthday: &str,
) -> serde_json::Value {
    let response = ctx
        .send(create_request(
            &contact_body(first, last, email, birthday),
            None,
        ))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
