//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Auth validator (protected only) → 3. Access log

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: bearer token required.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Access log (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route(
            "/profile/me",
            get(endpoints::profile::me)
                .put(endpoints::profile::update)
                .delete(endpoints::profile::delete),
        )
        .route(
            "/patient/baseline",
            post(endpoints::readings::set_baseline).get(endpoints::readings::get_baseline),
        )
        .route("/pefr/record", post(endpoints::readings::record_pefr))
        .route("/pefr/records", get(endpoints::readings::list_pefr))
        .route("/symptom/record", post(endpoints::readings::record_symptom))
        .route("/symptom/records", get(endpoints::readings::list_symptoms))
        .route("/patient/link-doctor", post(endpoints::patient::link_doctor))
        .route(
            "/patient/doctor",
            get(endpoints::patient::my_doctor).delete(endpoints::patient::unlink_doctor),
        )
        .route("/doctor/patients", get(endpoints::doctor::patients))
        .route("/patient/:id/pefr", get(endpoints::doctor::patient_pefr))
        .route("/patient/:id/symptoms", get(endpoints::doctor::patient_symptoms))
        .route(
            "/doctor/patient/:id",
            axum::routing::delete(endpoints::doctor::remove_patient),
        )
        .route(
            "/doctor/patient/:id/medication",
            post(endpoints::doctor::prescribe),
        )
        .route(
            "/doctor/patient/:id/medications/history",
            get(endpoints::doctor::medication_history),
        )
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::add),
        )
        .route(
            "/medications/:id",
            patch(endpoints::medications::update).delete(endpoints::medications::delete),
        )
        .route("/medications/:id/status", patch(endpoints::medications::set_status))
        .route("/medications/:id/take", post(endpoints::medications::take))
        .route(
            "/contacts/emergency",
            get(endpoints::contacts::list).post(endpoints::contacts::add),
        )
        .route(
            "/contacts/emergency/:id",
            axum::routing::delete(endpoints::contacts::delete),
        )
        .route(
            "/reminders",
            get(endpoints::reminders::list).post(endpoints::reminders::add),
        )
        .route("/reminders/:id", axum::routing::delete(endpoints::reminders::delete))
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/:id/read",
            patch(endpoints::notifications::mark_read),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last). Route layers
        // only, so unmatched paths fall through to a plain 404.
        .route_layer(axum::middleware::from_fn(middleware::audit::log_access))
        .route_layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes
    let public = Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route("/auth/signup", post(endpoints::auth::signup))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}
