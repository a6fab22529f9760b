//! Account endpoints.
//!
//! - `POST /auth/signup`: register
//! - `POST /auth/login`: form `username` + `password` → bearer token
//! - `POST /auth/logout`: revoke the presented token

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Form, Json};
use serde::Deserialize;

use crate::accounts::{self, LoginResponse, SignupRequest};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::User;

/// OAuth2 password-flow form; `username` carries the e-mail.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `POST /auth/signup`
pub async fn signup(
    State(ctx): State<ApiContext>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    let user = accounts::signup(&conn, &req, ctx.core.password_iterations)?;
    Ok(Json(user))
}

/// `POST /auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let session = accounts::login(&conn, &form.username, &form.password, ctx.core.token_ttl)?;
    Ok(Json(session))
}

/// `POST /auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    accounts::logout(&conn, &user.actor(), &user.token)?;
    Ok(StatusCode::NO_CONTENT)
}
