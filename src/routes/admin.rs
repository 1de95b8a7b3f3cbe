use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Admin Router Module
///
/// Routes for the administrator resource, nested under `/api/v1/admin` by `create_router`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/v1/admin/signup
        // Validates the payload, rejects duplicate identities, then creates the user and
        // admin rows atomically and returns a session token.
        .route("/signup", post(handlers::signup_admin).fallback(handlers::method_not_allowed))
}
