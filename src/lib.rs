use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod password;
pub mod registration;
pub mod repository;
pub mod response;
pub mod validation;

// Route groups (public, admin resource, development-only).
pub mod routes;
use routes::{admin, public, testing};

// --- Public Re-exports ---

pub use auth::TokenIssuer;
pub use config::AppConfig;
pub use error::{ApiError, StartupError};
pub use memory::InMemoryRepository;
pub use password::CredentialHasher;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::signup_admin, handlers::health, handlers::index),
    components(
        schemas(
            models::AdminSignupRequest, models::AdminUserView, models::SignupData,
            models::Gender, models::Role, models::HealthReport, models::ServiceInfo,
            response::FieldError, response::ErrorCode,
        )
    ),
    tags(
        (name = "village-portal", description = "Village management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of shared services handed to every request. Built once
/// at startup by `AppState::new`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, `InMemoryRepository` in tests.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
    pub hasher: CredentialHasher,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Derives the hasher and token issuer from `config`. Fails if the configured work factor
    /// is rejected or no signing key is present.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Result<Self, StartupError> {
        let hasher = CredentialHasher::from_config(&config)?;
        let tokens = TokenIssuer::from_config(&config)?;

        Ok(Self {
            repo,
            config,
            hasher,
            tokens,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the full route table and middleware stack. Called once at startup; the
/// returned router is never mutated.
///
/// Layer order, outermost first: CORS, request id, tracing, request-id propagation,
/// body size limit, routes, 404 fallback.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");
    let body_limit = state.config.body_limit_bytes;

    // 2. Route Table
    let mut routes = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api/v1/admin", admin::admin_routes());

    // The test group is decided by the configuration handed in, not by ambient globals.
    if state.config.env.exposes_test_routes() {
        routes = routes.merge(testing::testing_routes());
    }

    let base_router = routes
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` set by the layer above,
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
