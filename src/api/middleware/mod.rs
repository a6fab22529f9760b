//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token → `UserContext` (protected routes only)
//! 2. Access logger: method, path, status, user and latency per request

pub mod audit;
pub mod auth;
