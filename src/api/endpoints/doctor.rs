//! Doctor endpoints.
//!
//! - `GET /doctor/patients?search=&zone=`: dashboard
//! - `GET /patient/:id/pefr`, `GET /patient/:id/symptoms`
//! - `POST /doctor/patient/:id/medication`
//! - `GET /doctor/patient/:id/medications/history`
//! - `DELETE /doctor/patient/:id`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::care_team::{self, PatientFilter, PatientSummary};
use crate::medications;
use crate::models::{Medication, MedicationInput, MedicationWithHistory, PefrRecord, Symptom, Zone};

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub search: Option<String>,
    pub zone: Option<String>,
}

pub async fn patients(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    // Empty query values mean "no filter".
    let zone = match query.zone.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
        Some(raw) => Some(
            raw.parse::<Zone>()
                .map_err(|_| ApiError::BadRequest(format!("Unknown zone: {raw}")))?,
        ),
        None => None,
    };
    let filter = PatientFilter {
        search: query.search,
        zone,
    };

    let conn = ctx.open_db()?;
    Ok(Json(care_team::list_patients(&conn, &user.actor(), &filter)?))
}

pub async fn patient_pefr(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<PefrRecord>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(care_team::patient_readings(
        &conn,
        &user.actor(),
        patient_id,
        ctx.core.care_link,
    )?))
}

pub async fn patient_symptoms(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<Symptom>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(care_team::patient_symptoms(
        &conn,
        &user.actor(),
        patient_id,
        ctx.core.care_link,
    )?))
}

pub async fn prescribe(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<i64>,
    Json(input): Json<MedicationInput>,
) -> Result<Json<Medication>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::prescribe(
        &conn,
        &user.actor(),
        patient_id,
        &input,
        ctx.core.care_link,
    )?))
}

pub async fn medication_history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<MedicationWithHistory>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(medications::medication_history(
        &conn,
        &user.actor(),
        patient_id,
        ctx.core.care_link,
    )?))
}

pub async fn remove_patient(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    care_team::remove_patient(&conn, &user.actor(), patient_id)?;
    Ok(StatusCode::NO_CONTENT)
}
