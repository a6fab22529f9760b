//! Welcome and liveness endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// `GET /`: welcome message.
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to the {} API", crate::config::APP_NAME),
    })
}

/// `GET /health`: liveness plus a database round-trip.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.open_db()?;
    conn.query_row("SELECT 1", [], |_| Ok(()))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: "ok",
        version: crate::config::APP_VERSION,
    }))
}
