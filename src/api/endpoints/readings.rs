//! Patient self-recording endpoints.
//!
//! - `POST/GET /patient/baseline`
//! - `POST /pefr/record`, `GET /pefr/records`
//! - `POST /symptom/record`, `GET /symptom/records`

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{Baseline, PefrRecord, Symptom, SymptomEntry};
use crate::readings::{self, NewReading, RecordedReading, RecordedSymptom};

#[derive(Deserialize)]
pub struct BaselineRequest {
    pub baseline_value: i64,
}

pub async fn set_baseline(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<BaselineRequest>,
) -> Result<Json<Baseline>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::set_baseline(&conn, &user.actor(), req.baseline_value)?))
}

pub async fn get_baseline(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Baseline>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::get_baseline(&conn, &user.actor())?))
}

pub async fn record_pefr(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(reading): Json<NewReading>,
) -> Result<Json<RecordedReading>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::record_pefr(&conn, &user.actor(), &reading)?))
}

pub async fn list_pefr(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<PefrRecord>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::list_pefr(&conn, &user.actor())?))
}

pub async fn record_symptom(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(entry): Json<SymptomEntry>,
) -> Result<Json<RecordedSymptom>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::record_symptom(&conn, &user.actor(), &entry)?))
}

pub async fn list_symptoms(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Symptom>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(readings::list_symptoms(&conn, &user.actor())?))
}
