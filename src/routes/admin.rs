use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// Routes for catalog management, moderation, and oversight. Nested under
/// '/admin' by the application router.
///
/// Access Control:
/// Every handler here resolves the principal via the `AuthPrincipal` extractor
/// and then explicitly requires an administrative role (`require_admin`, or
/// `require_superadmin` for API key management) before touching the repository.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Core dashboard counters (users, courses, enrollments, certificates, jobs).
        .route("/stats", get(handlers::dashboards::get_admin_stats))
        // --- Course Catalog Management ---
        // Full hierarchy: course → module → lesson → resource.
        .route(
            "/courses",
            get(handlers::courses::list_all_courses).post(handlers::courses::create_course),
        )
        .route(
            "/courses/{id}",
            put(handlers::courses::update_course).delete(handlers::courses::delete_course),
        )
        .route(
            "/courses/{id}/modules",
            post(handlers::courses::create_module),
        )
        .route(
            "/modules/{id}",
            put(handlers::courses::update_module).delete(handlers::courses::delete_module),
        )
        .route(
            "/modules/{id}/lessons",
            post(handlers::courses::create_lesson),
        )
        .route(
            "/lessons/{id}",
            put(handlers::courses::update_lesson).delete(handlers::courses::delete_lesson),
        )
        .route(
            "/lessons/{id}/resources",
            post(handlers::courses::add_lesson_resource),
        )
        .route(
            "/resources/{id}",
            delete(handlers::courses::delete_lesson_resource),
        )
        // --- Quiz Management ---
        // Mutations here emit quiz.created / quiz.updated / quiz.deleted events.
        .route("/quizzes", post(handlers::quizzes::create_quiz))
        .route(
            "/quizzes/{id}",
            put(handlers::quizzes::update_quiz).delete(handlers::quizzes::delete_quiz),
        )
        // --- Oversight ---
        // GET /admin/enrollments
        // All enrollments across all students.
        .route("/enrollments", get(handlers::enrollments::list_enrollments))
        // POST /admin/certificates
        // Issues a course certificate to a student.
        .route(
            "/certificates",
            post(handlers::certificates::issue_certificate),
        )
        // --- External API Keys (superadmin only) ---
        .route(
            "/api-keys",
            get(handlers::admin::list_api_keys).post(handlers::admin::create_api_key),
        )
        .route(
            "/api-keys/{id}/revoke",
            post(handlers::admin::revoke_api_key),
        )
}
