//! REST API endpoints.
//!
//! Axum-based HTTP API serving the tier list, deck details and
//! matchup charts computed from the configured matchup export.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::calculate::AggregateError;
use crate::storage::StorageError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NoData(_) => (StatusCode::SERVICE_UNAVAILABLE, "NO_DATA"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        match &err {
            AggregateError::InvalidInput(_) => ApiError::NoData(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PathNotFound(path) => {
                ApiError::NoData(format!("dataset {} does not exist", path.display()))
            }
            StorageError::Malformed(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(routes::meta::health))
        .route("/api/meta-data", get(routes::meta::meta_data))
        .route("/api/tiers", get(routes::meta::tiers))
        .route("/api/decks", get(routes::meta::decks))
        .route("/api/decks/leaders", get(routes::meta::deck_leaders))
        .route("/api/decks/:key", get(routes::meta::deck_detail))
        .route("/api/matchups/matrix", get(routes::meta::matchup_matrix_route))
        .route("/api/matchups/highlights", get(routes::meta::matchup_highlights_route))
        .route("/api/refresh", post(routes::refresh::refresh))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
