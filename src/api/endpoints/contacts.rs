//! `GET/POST /contacts/emergency`, `DELETE /contacts/emergency/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{EmergencyContact, EmergencyContactInput};
use crate::self_care;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<EmergencyContact>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(self_care::list_contacts(&conn, &user.actor())?))
}

pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<EmergencyContactInput>,
) -> Result<Json<EmergencyContact>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(self_care::add_contact(&conn, &user.actor(), &input)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    self_care::delete_contact(&conn, &user.actor(), id)?;
    Ok(StatusCode::NO_CONTENT)
}
