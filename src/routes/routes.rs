//! Defines routes for the bin-tracking API.
//!
//! ## Structure
//! - **Bin endpoints**
//!   - `GET  /api/bins`      — list bins, most recently collected first
//!   - `POST /api/bins`      — create a bin
//!   - `PUT  /api/bins/{id}` — partially update a bin
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`
//!
//! Every route, including the fallback, sits behind the CORS middleware, which
//! also answers `OPTIONS` for any path.

use crate::{
    errors::AppError,
    handlers::{
        bin_handlers::{create_bin, list_bins, update_bin},
        health_handlers::{healthz, readyz},
    },
    routes::cors::cors,
    services::bin_service::BinService,
};
use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

/// Build the router for the whole API. The router carries the shared
/// `BinService` to all handlers.
pub fn routes() -> Router<BinService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/bins", get(list_bins).post(create_bin))
        .route("/api/bins/{id}", put(update_bin))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors))
}

async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

async fn method_not_allowed() -> AppError {
    AppError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
