use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and accessible to any client. These
/// cover the four login flows, youth registration, refresh-token rotation, and
/// read-only access to the published catalog (courses, open jobs).
///
/// Security Mandate:
/// Catalog handlers in this module only serve rows explicitly marked published
/// or open; the restriction is enforced at the Repository query level.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated probe used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // --- Authentication Gateway ---
        // One login endpoint per tenant family; all four run the same
        // login/verify/issue-token routine.
        .route("/auth/user/login", post(handlers::auth::login_user))
        .route("/auth/company/login", post(handlers::auth::login_company))
        .route(
            "/auth/institution/login",
            post(handlers::auth::login_institution),
        )
        .route(
            "/auth/municipality/login",
            post(handlers::auth::login_municipality),
        )
        // POST /auth/user/register
        // Youth registration; user + profile created atomically.
        .route("/auth/user/register", post(handlers::auth::register_user))
        // POST /auth/refresh
        // Rotates a single-use refresh token into a fresh token pair.
        .route("/auth/refresh", post(handlers::auth::refresh_token))
        // --- Public Catalog ---
        // GET /courses, GET /courses/{id}
        // Published courses only.
        .route("/courses", get(handlers::courses::list_courses))
        .route("/courses/{id}", get(handlers::courses::get_course))
        // GET /jobs, GET /jobs/{id}
        // Open job postings.
        .route("/jobs", get(handlers::jobs::list_jobs))
        .route("/jobs/{id}", get(handlers::jobs::get_job))
}
