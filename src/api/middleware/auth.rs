//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it to a live
//! session and injects `UserContext` into request extensions for
//! downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::accounts;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};

/// Require a valid, unexpired bearer token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
/// On success: injects `UserContext` and adds `Cache-Control: no-store`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // 2. Resolve against the sessions table
    let user = {
        let conn = ctx.open_db()?;
        accounts::resolve_token(&conn, &token).map_err(|e| {
            tracing::debug!(path = %req.uri().path(), "Bearer token rejected");
            ApiError::from(e)
        })?
    }; // Connection dropped here, before any .await

    // 3. Inject user context for downstream handlers
    req.extensions_mut().insert(UserContext {
        user_id: user.id,
        role: user.role,
        token,
    });

    // 4. Process request
    let mut response = next.run(req).await;

    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));

    Ok(response)
}
