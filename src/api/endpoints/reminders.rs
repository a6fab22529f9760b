//! `GET/POST /reminders`, `DELETE /reminders/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{Reminder, ReminderInput};
use crate::self_care;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(self_care::list_reminders(&conn, &user.actor())?))
}

pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<ReminderInput>,
) -> Result<Json<Reminder>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(self_care::add_reminder(&conn, &user.actor(), &input)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    self_care::delete_reminder(&conn, &user.actor(), id)?;
    Ok(StatusCode::NO_CONTENT)
}
