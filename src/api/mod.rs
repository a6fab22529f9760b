//! HTTP API.
//!
//! Exposes the account, recording, care-team and self-care services as
//! JSON endpoints. Public routes (welcome, health, signup, login) sit
//! beside a protected set guarded by bearer token authentication.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, start_server_on, ApiServer, ServerInfo};
pub use types::ApiContext;
