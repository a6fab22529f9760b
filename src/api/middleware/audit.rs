//! Access logging middleware.
//!
//! Logs every request with method, path, status, caller and latency via
//! `tracing`. Stamps each response with an `X-Request-Id`. Runs innermost,
//! after auth has injected `UserContext`. Nothing is written to the
//! database here; domain audit entries come from the services.

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::UserContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_id = req.extensions().get::<UserContext>().map(|u| u.user_id);
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        request_id = %request_id,
        %method,
        path = %path,
        status,
        user_id,
        latency_ms,
        "request"
    );

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("X-Request-Id", val);
    }
    response
}
