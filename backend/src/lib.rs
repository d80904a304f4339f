//! # Kitten Show Backend
//!
//! A small REST API over two tables, `breeds` and `kittens`.
//!
//! ## Architecture
//!
//! ```text
//! REST layer (axum handlers, validation, error mapping)
//!     ↓
//! Session (one pooled connection per request, one transaction per write)
//!     ↓
//! DbConnection (SQLite pool, schema creation)
//! ```
//!
//! The pool is created once at startup, owned by [`AppState`] and handed to
//! every handler through axum's `State`. Nothing is stored in globals.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rest;
pub mod session;

use axum::{
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::db::DbConnection;

/// Prefix every route is nested under
pub const API_PREFIX: &str = "/api/v1";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

/// Open the database, create the schema and build the application state
pub async fn initialize_backend(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database).await?;

    info!("Setting up application state");
    Ok(AppState::new(db))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/breeds", get(rest::list_breeds))
        .route(
            "/kittens",
            get(rest::list_kittens).post(rest::create_kitten),
        )
        .route(
            "/kittens/:id",
            get(rest::get_kitten)
                .patch(rest::update_kitten)
                .delete(rest::delete_kitten),
        );

    Router::new()
        .nest(API_PREFIX, api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
