use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
};

// Per-route body caps for the upload pipeline: the category limit plus slack
// for multipart framing. The precise per-category check runs in the handler.
const IMAGE_BODY_LIMIT: usize = 3 * 1024 * 1024;
const VIDEO_BODY_LIMIT: usize = 105 * 1024 * 1024;
const DOCUMENT_BODY_LIMIT: usize = 11 * 1024 * 1024;

/// Authenticated Router Module
///
/// Routes accessible to any principal that passed the authentication layer,
/// regardless of tenant family. Tenant- and ownership-specific restrictions
/// (youth-only enrollment, company-only job mutation, `can_access` ownership
/// checks) are enforced inside the handlers.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthPrincipal` extractor
/// middleware being present on the router layer above this module, so all
/// handlers receive a validated principal with id, role and tenant family.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session & Profile ---
        // GET /me
        // The authenticated principal's identity.
        .route("/me", get(handlers::auth::get_me))
        // GET/PUT /me/profile
        // The youth account's profile (organisation accounts have none).
        .route(
            "/me/profile",
            get(handlers::auth::get_my_profile).put(handlers::auth::update_my_profile),
        )
        // GET /me/organisation
        // The organisation record behind a company/institution/municipality session.
        .route(
            "/me/organisation",
            get(handlers::auth::get_my_organisation),
        )
        // PUT /auth/password
        // Password change for any tenant family; re-verifies the current password.
        .route("/auth/password", put(handlers::auth::change_password))
        // GET /me/dashboard
        // Activity summary for the youth account.
        .route("/me/dashboard", get(handlers::dashboards::get_my_dashboard))
        // --- Enrollments ---
        // POST /enrollments
        // Enrolls the requesting student; duplicates get the fixed 400 message.
        .route("/enrollments", post(handlers::enrollments::create_enrollment))
        .route(
            "/me/enrollments",
            get(handlers::enrollments::list_my_enrollments),
        )
        // GET /enrollments/{id}
        // The enriched course → modules → lessons structure. Owner or admin.
        .route(
            "/enrollments/{id}",
            get(handlers::enrollments::get_enrollment_detail),
        )
        .route(
            "/enrollments/{id}/status",
            patch(handlers::enrollments::update_enrollment_status),
        )
        // --- Quizzes ---
        // GET /quizzes/{id}
        // Redacted question set for quiz takers.
        .route("/quizzes/{id}", get(handlers::quizzes::get_quiz))
        // POST /quizzes/{id}/complete
        // Scores a submission; attempt + answers + score written transactionally.
        .route(
            "/quizzes/{id}/complete",
            post(handlers::quizzes::complete_quiz),
        )
        .route("/me/attempts", get(handlers::quizzes::list_my_attempts))
        // GET /attempts/{id}
        // Post-completion review: the attempt plus its recorded answers.
        .route("/attempts/{id}", get(handlers::quizzes::get_attempt))
        // --- Certificates ---
        .route(
            "/me/certificates",
            get(handlers::certificates::list_my_certificates),
        )
        .route(
            "/certificates/{id}",
            get(handlers::certificates::get_certificate),
        )
        // --- Job Postings (company self-service) ---
        .route("/jobs", post(handlers::jobs::create_job))
        .route(
            "/jobs/{id}",
            put(handlers::jobs::update_job).delete(handlers::jobs::delete_job),
        )
        // --- Upload Pipeline ---
        // One endpoint per category, each with a matching body cap so oversize
        // requests are rejected before the handler buffers them.
        .route(
            "/uploads/image",
            post(handlers::uploads::upload_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route(
            "/uploads/video",
            post(handlers::uploads::upload_video).layer(DefaultBodyLimit::max(VIDEO_BODY_LIMIT)),
        )
        .route(
            "/uploads/document",
            post(handlers::uploads::upload_document)
                .layer(DefaultBodyLimit::max(DOCUMENT_BODY_LIMIT)),
        )
}
