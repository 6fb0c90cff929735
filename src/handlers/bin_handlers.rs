//! HTTP handlers for `/api/bins`.
//!
//! Bodies are read as raw bytes and validated here, so type errors surface as
//! the API's `{"error": ...}` messages instead of extractor rejections.

use crate::{
    errors::AppError,
    models::bin::Bin,
    services::bin_service::BinService,
    validation::{self, ValidationError},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

/// `GET /api/bins`
pub async fn list_bins(State(service): State<BinService>) -> Result<Json<Vec<Bin>>, AppError> {
    Ok(Json(service.list_bins().await?))
}

/// `POST /api/bins` — body `{ location, fullnessPercentage }`.
pub async fn create_bin(
    State(service): State<BinService>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request = validation::parse_new_bin(&parse_body(&body)?)?;
    let bin = service.create_bin(request).await?;
    Ok((StatusCode::CREATED, Json(bin)))
}

/// `PUT /api/bins/{id}` — merge the supplied fields into the bin.
pub async fn update_bin(
    State(service): State<BinService>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Bin>, AppError> {
    // A segment that does not even decode as UTF-8 is still just a bad id.
    let Path(id) = id.map_err(|_| ValidationError::InvalidId)?;
    let id = validation::validate_id(&id)?;
    let patch = validation::parse_patch(&parse_body(&body)?)?;
    Ok(Json(service.update_bin(id, patch).await?))
}

fn parse_body(body: &Bytes) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)
}
