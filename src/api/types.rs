//! Shared types for the HTTP layer.

use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::authorization::Actor;
use crate::core_state::CoreState;
use crate::models::Role;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware. Immutable after startup.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Per-request database connection.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        self.core.open_db().map_err(ApiError::from)
    }
}

// ═══════════════════════════════════════════════════════════
// User context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, inserted into request extensions after the
/// bearer token resolves to a live session.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: i64,
    pub role: Role,
    /// Raw bearer token, kept so logout can revoke exactly this session.
    pub(crate) token: String,
}

impl UserContext {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            role: self.role,
        }
    }
}
