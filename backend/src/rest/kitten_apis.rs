//! # REST API for Kittens
//!
//! Endpoints for listing, creating, retrieving, updating, and deleting kittens.
//! Each handler opens its own session after the request has been extracted
//! and validated, so malformed input never touches the database.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use shared::{CreateKittenRequest, DetailsResponse, Kitten, UpdateKittenRequest};
use tracing::info;

use super::error::ApiError;
use super::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::{AppState, API_PREFIX};

/// Query parameters for kitten listing
#[derive(Debug, Deserialize)]
pub struct KittenListQuery {
    pub filter_breed_id: Option<i64>,
}

/// List kittens, optionally filtered by breed
pub async fn list_kittens(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<KittenListQuery>,
) -> Result<Json<Vec<Kitten>>, ApiError> {
    info!("GET /api/v1/kittens - query: {:?}", query);

    let mut session = state.db.session().await?;
    let kittens = session.list_kittens(query.filter_breed_id).await?;

    Ok(Json(kittens.into_iter().map(Kitten::from).collect()))
}

/// Get a kitten by ID
pub async fn get_kitten(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Kitten>, ApiError> {
    info!("GET /api/v1/kittens/{}", id);

    let mut session = state.db.session().await?;
    let kitten = session.get_kitten(id).await?;

    Ok(Json(kitten.into()))
}

/// Create a new kitten; responds 201 with a `Location` header and no body
pub async fn create_kitten(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateKittenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/v1/kittens - request: {:?}", request);

    let mut session = state.db.session().await?;
    let id = session.create_kitten(request.into()).await?;

    let location = format!("{}/kittens/{}", API_PREFIX, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// Update the provided fields of a kitten
pub async fn update_kitten(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateKittenRequest>,
) -> Result<Json<DetailsResponse>, ApiError> {
    info!("PATCH /api/v1/kittens/{} - request: {:?}", id, request);

    let mut session = state.db.session().await?;
    session.update_kitten(id, request.into()).await?;

    Ok(Json(DetailsResponse::new("Updated successfully")))
}

/// Delete a kitten
pub async fn delete_kitten(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DetailsResponse>, ApiError> {
    info!("DELETE /api/v1/kittens/{}", id);

    let mut session = state.db.session().await?;
    session.delete_kitten(id).await?;

    Ok(Json(DetailsResponse::new("Deleted successfully")))
}
