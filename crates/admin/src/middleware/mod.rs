//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Admin gate on `/admin/*` (token cookie check)

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, admin_gate};
pub use session::create_session_layer;
