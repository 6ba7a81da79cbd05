//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use cardfile_api::{app::AppState, config::Config};
//! use cardfile_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(DatabaseConfig {
//!     url: config.database.url.clone(),
//!     max_connections: config.database.max_connections,
//!     ..Default::default()
//! })
//! .await?;
//! let state = AppState::new(pool, config);
//! let app = cardfile_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::middleware::rate_limit::{RateLimit, RateLimiter};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Per-client rate limiter shared across requests
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let rate_limiter = RateLimiter::new(RateLimit::per_minute(
            config.rate_limit.requests_per_minute,
        ));

        Self {
            db,
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check
/// └── /contacts/
///     ├── POST   /                  # Create contact         (rate limited)
///     ├── GET    /                  # List contacts          (rate limited)
///     ├── GET    /birthdays         # Birthdays in next week (rate limited)
///     ├── GET    /search?query=     # Substring search
///     ├── GET    /:id               # Get contact            (rate limited)
///     ├── PUT    /:id               # Partial update
///     └── DELETE /:id               # Delete contact
/// ```
///
/// The rate limiter intentionally covers only create, list, get-by-id, and
/// birthdays; update, delete, and search are unmetered. The split is wired
/// per method router so it stays visible here rather than buried in the
/// middleware.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Rate limiting (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let rate_limit = axum::middleware::from_fn_with_state(
        state.clone(),
        crate::middleware::rate_limit::rate_limit_layer,
    );

    // Health check (public, unmetered)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let contact_routes = Router::new()
        .route(
            "/",
            post(routes::contacts::create_contact)
                .get(routes::contacts::list_contacts)
                .layer(rate_limit.clone()),
        )
        .route(
            "/birthdays",
            get(routes::contacts::upcoming_birthdays).layer(rate_limit.clone()),
        )
        .route("/search", get(routes::contacts::search_contacts))
        .route("/:id", get(routes::contacts::get_contact).layer(rate_limit))
        .route(
            "/:id",
            put(routes::contacts::update_contact).delete(routes::contacts::delete_contact),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .merge(health_routes)
        .nest("/contacts", contact_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
