//! Registration, login sessions and profile management.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::authorization::Actor;
use crate::core_state::{log_audit, CoreError};
use crate::crypto::{generate_token, hash_password, hash_token, verify_password};
use crate::db::{now_timestamp, repository};
use crate::models::{NewUser, ProfileFields, Role, User};

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub age: Option<i32>,
    pub height: Option<i32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_role: Role,
}

/// Register a new account. A taken e-mail (any case) is a conflict.
pub fn signup(conn: &Connection, req: &SignupRequest, iterations: u32) -> Result<User, CoreError> {
    let email = req.email.trim();
    if !EMAIL_PATTERN.is_match(email) {
        return Err(CoreError::Validation("email is not a valid address".into()));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if repository::get_user_by_email(conn, email)?.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(&req.password, iterations)?;
    let new_user = NewUser {
        email: email.to_string(),
        name: name.to_string(),
        role: req.role,
        password_hash,
        age: req.age,
        height: req.height,
        gender: req.gender.clone(),
        contact_number: req.contact_number.clone(),
        address: req.address.clone(),
    };

    let user = match repository::insert_user(conn, &new_user) {
        Ok(user) => user,
        Err(e) if e.is_constraint_violation() => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };

    log_audit(conn, Some(user.id), "auth.signup", Some(&format!("user:{}", user.id)));
    tracing::info!(user_id = user.id, role = %user.role, "Account created");
    Ok(user)
}

/// Verify credentials and issue a bearer token valid for `ttl`.
pub fn login(
    conn: &Connection,
    email: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<LoginResponse, CoreError> {
    let Some((user, stored_hash)) = repository::get_credentials_by_email(conn, email.trim())? else {
        log_audit(conn, None, "auth.login_failed", None);
        return Err(CoreError::Unauthorized);
    };
    if !verify_password(password, &stored_hash)? {
        log_audit(conn, Some(user.id), "auth.login_failed", None);
        return Err(CoreError::Unauthorized);
    }

    let token = generate_token();
    let expires_at = now_timestamp() + ttl;
    repository::insert_session(conn, &hash_token(&token), user.id, &expires_at)?;
    log_audit(conn, Some(user.id), "auth.login", None);

    Ok(LoginResponse {
        access_token: token,
        token_type: "bearer",
        user_role: user.role,
    })
}

/// Resolve a bearer token to its user; unknown or expired is `Unauthorized`.
pub fn resolve_token(conn: &Connection, token: &str) -> Result<User, CoreError> {
    repository::find_session_user(conn, &hash_token(token), &now_timestamp())?
        .ok_or(CoreError::Unauthorized)
}

pub fn logout(conn: &Connection, actor: &Actor, token: &str) -> Result<(), CoreError> {
    repository::delete_session(conn, &hash_token(token))?;
    log_audit(conn, Some(actor.id), "auth.logout", None);
    Ok(())
}

pub fn get_profile(conn: &Connection, actor: &Actor) -> Result<User, CoreError> {
    repository::get_user(conn, actor.id)?.ok_or(CoreError::Unauthorized)
}

pub fn update_profile(
    conn: &Connection,
    actor: &Actor,
    fields: &ProfileFields,
) -> Result<User, CoreError> {
    if fields.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    let user = repository::update_profile(conn, actor.id, fields)?.ok_or(CoreError::Unauthorized)?;
    log_audit(conn, Some(actor.id), "profile.update", Some(&format!("user:{}", actor.id)));
    Ok(user)
}

/// Delete the caller's account and, by cascade, everything it owns.
pub fn delete_account(conn: &Connection, actor: &Actor) -> Result<(), CoreError> {
    repository::delete_user(conn, actor.id)?;
    log_audit(conn, Some(actor.id), "profile.delete", Some(&format!("user:{}", actor.id)));
    tracing::info!(user_id = actor.id, "Account deleted");
    Ok(())
}

fn email_taken() -> CoreError {
    CoreError::Conflict("Email already registered".into())
}
