use crate::{
    AppState,
    config::AppConfig,
    error::ApiError,
    models::{AdminSignupRequest, HealthReport, ServiceInfo, SignupData},
    registration::{self, AdminSignup},
    response::ApiResponse,
    repository::RepositoryState,
    validation::ValidatedJson,
};
use axum::extract::State;

fn service_info(config: &AppConfig) -> ServiceInfo {
    ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.env.as_str().to_string(),
    }
}

// --- Handlers ---

/// signup_admin
///
/// [Public Route] Registers a new administrator and returns the admin profile together with
/// a signed session token.
///
/// *Validation* happens in the `ValidatedJson` extractor, so this handler only ever sees a
/// payload that satisfies every field rule.
#[utoipa::path(
    post,
    path = "/api/v1/admin/signup",
    request_body = AdminSignupRequest,
    responses(
        (status = 201, description = "Admin registered; body is the envelope with `data` = SignupData", body = SignupData),
        (status = 409, description = "A user with this email, phone number or national ID already exists"),
        (status = 422, description = "One or more fields failed validation")
    )
)]
pub async fn signup_admin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AdminSignupRequest>,
) -> Result<ApiResponse<SignupData>, ApiError> {
    let signup = AdminSignup::try_from(payload)?;
    let data =
        registration::register_admin(state.repo.as_ref(), &state.hasher, &state.tokens, signup)
            .await?;

    Ok(ApiResponse::created("Signed up successfully", data))
}

/// health
///
/// [Public Route] Liveness/readiness probe. Reports 503 when the store cannot be reached.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthReport),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn health(
    State(repo): State<RepositoryState>,
) -> Result<ApiResponse<HealthReport>, ApiError> {
    match repo.ping().await {
        Ok(()) => Ok(ApiResponse::ok(
            "OK",
            HealthReport {
                status: "up".to_string(),
                store: "up".to_string(),
            },
        )),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            Err(ApiError::Unavailable)
        }
    }
}

/// index
///
/// [Public Route] Service banner.
#[utoipa::path(
    get,
    path = "/index",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn index(State(config): State<AppConfig>) -> ApiResponse<ServiceInfo> {
    ApiResponse::ok("Welcome to the Village Portal API", service_info(&config))
}

/// test_route
///
/// [Development Route] Confirms the non-production route group is mounted.
pub async fn test_route(State(config): State<AppConfig>) -> ApiResponse<ServiceInfo> {
    ApiResponse::ok("Test route reached", service_info(&config))
}

/// test_error
///
/// [Development Route] Fails on purpose so the 500 path (logging + masked envelope) can be
/// exercised end to end.
pub async fn test_error() -> Result<ApiResponse<()>, ApiError> {
    Err(ApiError::Infrastructure(
        "deliberate failure from /test/error".to_string(),
    ))
}

// --- Fallbacks ---

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
