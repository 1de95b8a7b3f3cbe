use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without credentials that carry no resource data.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by monitoring and load balancers. Pings the store so a lost database
        // connection shows up as 503 instead of a false "ok".
        .route("/health", get(handlers::health).fallback(handlers::method_not_allowed))
        // GET /index
        // Service name, version and environment.
        .route("/index", get(handlers::index).fallback(handlers::method_not_allowed))
}
