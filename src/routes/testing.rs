use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Testing Router Module
///
/// Mounted only when the loaded `Env` is development or test; see `Env::exposes_test_routes`.
pub fn testing_routes() -> Router<AppState> {
    Router::new()
        // GET /test
        .route("/test", get(handlers::test_route).fallback(handlers::method_not_allowed))
        // GET /test/error
        // Always fails with a 500 envelope.
        .route("/test/error", get(handlers::test_error).fallback(handlers::method_not_allowed))
}
