//! `GET /notifications`, `PATCH /notifications/:id/read`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::Notification;
use crate::self_care;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(self_care::list_notifications(&conn, &user.actor())?))
}

pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    self_care::mark_read(&conn, &user.actor(), id)?;
    Ok(StatusCode::NO_CONTENT)
}
