use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
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
pub mod models;
pub mod notify;
pub mod repository;
pub mod scoring;
pub mod storage;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthPrincipal; // The resolved authenticated identity.
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use notify::{BroadcastNotifier, MockNotifier, NotifierState};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login_user, handlers::auth::login_company,
        handlers::auth::login_institution, handlers::auth::login_municipality,
        handlers::auth::register_user, handlers::auth::refresh_token,
        handlers::auth::change_password, handlers::auth::get_me,
        handlers::auth::get_my_organisation,
        handlers::auth::get_my_profile, handlers::auth::update_my_profile,
        handlers::courses::list_courses, handlers::courses::get_course,
        handlers::courses::list_all_courses, handlers::courses::create_course,
        handlers::courses::update_course, handlers::courses::delete_course,
        handlers::courses::create_module, handlers::courses::update_module,
        handlers::courses::delete_module,
        handlers::courses::create_lesson, handlers::courses::update_lesson,
        handlers::courses::delete_lesson,
        handlers::courses::add_lesson_resource, handlers::courses::delete_lesson_resource,
        handlers::enrollments::create_enrollment, handlers::enrollments::list_my_enrollments,
        handlers::enrollments::get_enrollment_detail,
        handlers::enrollments::update_enrollment_status, handlers::enrollments::list_enrollments,
        handlers::quizzes::get_quiz, handlers::quizzes::complete_quiz,
        handlers::quizzes::list_my_attempts, handlers::quizzes::get_attempt,
        handlers::quizzes::create_quiz,
        handlers::quizzes::update_quiz, handlers::quizzes::delete_quiz,
        handlers::certificates::list_my_certificates, handlers::certificates::get_certificate,
        handlers::certificates::issue_certificate,
        handlers::jobs::list_jobs, handlers::jobs::get_job, handlers::jobs::create_job,
        handlers::jobs::update_job, handlers::jobs::delete_job,
        handlers::uploads::upload_image, handlers::uploads::upload_video,
        handlers::uploads::upload_document,
        handlers::dashboards::get_admin_stats, handlers::dashboards::get_my_dashboard,
        handlers::admin::create_api_key, handlers::admin::list_api_keys,
        handlers::admin::revoke_api_key,
    ),
    components(
        schemas(
            models::TenantKind, models::User, models::Profile, models::TenantAccount,
            models::Job, models::Course, models::CourseModule, models::Lesson,
            models::LessonResource, models::CourseEnrollment, models::Quiz,
            models::QuizAttempt, models::QuizAnswer, models::Certificate,
            models::ExternalApiKey, models::LoginRequest, models::RegisterUserRequest,
            models::ChangePasswordRequest, models::RefreshRequest, models::UpdateProfileRequest,
            models::CreateCourseRequest, models::UpdateCourseRequest, models::CreateModuleRequest,
            models::UpdateModuleRequest, models::CreateLessonRequest, models::UpdateLessonRequest,
            models::CreateResourceRequest,
            models::CreateEnrollmentRequest, models::UpdateEnrollmentStatusRequest,
            models::NewQuestion, models::CreateQuizRequest, models::UpdateQuizRequest,
            models::SubmittedAnswer, models::CompleteQuizRequest, models::CreateJobRequest,
            models::UpdateJobRequest, models::IssueCertificateRequest,
            models::CreateApiKeyRequest, models::AccountSummary, models::LoginResponse,
            models::RegisteredUser, models::QuestionView, models::QuizView,
            models::AttemptDetail, models::LessonDetail, models::ModuleDetail,
            models::EnrollmentDetail,
            models::UploadResponse, models::AdminDashboardStats, models::StudentDashboard,
        )
    ),
    tags(
        (name = "skillbridge", description = "Education / youth-employment platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: the single, thread-safe, immutable
/// container holding all essential application services and configuration,
/// shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Storage Layer: abstracts S3/MinIO access for the upload pipeline.
    pub storage: StorageState,
    /// Real-time Notifier: fan-out channel for quiz mutation events.
    pub notifier: NotifierState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers and extractors to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for NotifierState {
    fn from_ref(app_state: &AppState) -> NotifierState {
        app_state.notifier.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the `authenticated_routes`.
///
/// *Mechanism*: attempts to extract `AuthPrincipal` from the request. Since
/// `AuthPrincipal` implements `FromRequestParts`, if authentication (JWT
/// validation, principal lookup) fails, the extractor rejects the request with
/// a 401 before the handler runs.
async fn auth_middleware(_principal: AuthPrincipal, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated Routes: protected by the `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin Routes: nested under '/admin'. The role check is performed
        // *inside* the handlers after the principal has been resolved.
        .nest("/admin", admin::admin_routes())
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a span
                // that carries the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: the x-request-id header is returned
                // to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: extracts the
/// `x-request-id` header (if present) and includes it in the structured logging
/// metadata alongside the HTTP method and URI, so every log line for a single
/// request is correlated by a unique ID.
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
