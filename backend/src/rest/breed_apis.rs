//! # REST API for Breeds
//!
//! Breeds are read-only over HTTP; they are created by seeding.

use axum::{extract::State, response::Json};
use shared::Breed;
use tracing::info;

use super::error::ApiError;
use crate::AppState;

/// List all breeds
pub async fn list_breeds(State(state): State<AppState>) -> Result<Json<Vec<Breed>>, ApiError> {
    info!("GET /api/v1/breeds");

    let mut session = state.db.session().await?;
    let breeds = session.list_breeds().await?;

    Ok(Json(breeds.into_iter().map(Breed::from).collect()))
}
