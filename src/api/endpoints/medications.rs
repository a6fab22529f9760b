//! Patient medication endpoints.
//!
//! - `GET/POST /medications`
//! - `PATCH/DELETE /medications/:id`
//! - `PATCH /medications/:id/status`
//! - `POST /medications/:id/take`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::medications::{self, DoseTaken, StatusChange};
use crate::models::{Medication, MedicationInput, MedicationUpdate};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::list_medications(&conn, &user.actor())?))
}

pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<MedicationInput>,
) -> Result<Json<Medication>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::add_medication(&conn, &user.actor(), &input)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(update): Json<MedicationUpdate>,
) -> Result<Json<Medication>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::update_medication(&conn, &user.actor(), id, &update)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    medications::delete_medication(&conn, &user.actor(), id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Medication>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::set_status(&conn, &user.actor(), id, &change)?))
}

pub async fn take(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(taken): Json<DoseTaken>,
) -> Result<Json<Medication>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::take(&conn, &user.actor(), id, &taken)?))
}
