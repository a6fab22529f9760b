//! `GET/PUT/DELETE /profile/me`

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::accounts;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{ProfileFields, User};

pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(accounts::get_profile(&conn, &user.actor())?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(accounts::update_profile(&conn, &user.actor(), &fields)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    accounts::delete_account(&conn, &user.actor())?;
    Ok(StatusCode::NO_CONTENT)
}
