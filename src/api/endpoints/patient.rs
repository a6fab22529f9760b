//! Patient-side care-team endpoints.
//!
//! - `POST /patient/link-doctor`
//! - `GET/DELETE /patient/doctor`

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::care_team;
use crate::models::{DoctorPatientLink, User};

#[derive(Deserialize)]
pub struct LinkDoctorRequest {
    pub doctor_email: String,
}

pub async fn link_doctor(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<LinkDoctorRequest>,
) -> Result<Json<DoctorPatientLink>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(care_team::link_doctor(&conn, &user.actor(), &req.doctor_email)?))
}

pub async fn my_doctor(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(care_team::linked_doctor(&conn, &user.actor())?))
}

pub async fn unlink_doctor(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    care_team::unlink_doctor(&conn, &user.actor())?;
    Ok(StatusCode::NO_CONTENT)
}
