use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthPrincipal, can_access, require_admin},
    error::ApiError,
    models::{
        CourseEnrollment, CreateEnrollmentRequest, EnrollmentDetail, TenantKind,
        UpdateEnrollmentStatusRequest,
    },
};

const ENROLLMENT_STATUSES: [&str; 3] = ["active", "completed", "dropped"];

/// create_enrollment
///
/// [Authenticated Route] Enrolls the requesting youth account into a published
/// course. The student id always comes from the authenticated principal, never
/// the body. A duplicate (student, course) pair yields the fixed 400 message.
#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrolled", body = CourseEnrollment),
        (status = 400, description = "Already enrolled"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_enrollment(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> Result<(StatusCode, Json<CourseEnrollment>), ApiError> {
    if principal.tenant != TenantKind::User {
        return Err(ApiError::forbidden("Only youth accounts can enroll"));
    }

    // Unpublished courses read as missing for enrollment purposes.
    state
        .repo
        .get_course(payload.course_id)
        .await?
        .filter(|course| course.is_published)
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let enrollment = state
        .repo
        .create_enrollment(principal.id, payload.course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// list_my_enrollments
///
/// [Authenticated Route] The requesting student's enrollments, newest first.
#[utoipa::path(
    get,
    path = "/me/enrollments",
    responses((status = 200, description = "My enrollments", body = [CourseEnrollment]))
)]
pub async fn list_my_enrollments(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseEnrollment>>, ApiError> {
    Ok(Json(
        state.repo.list_enrollments_for_student(principal.id).await?,
    ))
}

/// get_enrollment_detail
///
/// [Authenticated Route] The enriched course → modules → lessons structure for
/// one enrollment, each lesson carrying its resources and quizzes.
///
/// *Authorization*: self-service or privileged-override via `can_access`.
#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enriched enrollment", body = EnrollmentDetail),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_enrollment_detail(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentDetail>, ApiError> {
    let enrollment = state
        .repo
        .get_enrollment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if !can_access(&principal, enrollment.student_id) {
        return Err(ApiError::forbidden("Not your enrollment"));
    }

    let detail = state
        .repo
        .get_enrollment_detail(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;
    Ok(Json(detail))
}

/// update_enrollment_status
///
/// [Authenticated Route] Moves an enrollment between 'active', 'completed'
/// and 'dropped'. Owner or admin only.
#[utoipa::path(
    patch,
    path = "/enrollments/{id}/status",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentStatusRequest,
    responses(
        (status = 200, description = "Updated", body = CourseEnrollment),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_enrollment_status(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnrollmentStatusRequest>,
) -> Result<Json<CourseEnrollment>, ApiError> {
    if !ENROLLMENT_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::validation(
            "status must be one of 'active', 'completed', 'dropped'",
        ));
    }

    let enrollment = state
        .repo
        .get_enrollment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if !can_access(&principal, enrollment.student_id) {
        return Err(ApiError::forbidden("Not your enrollment"));
    }

    let updated = state
        .repo
        .set_enrollment_status(id, &payload.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;
    Ok(Json(updated))
}

/// list_enrollments
///
/// [Admin Route] All enrollments across all students.
#[utoipa::path(
    get,
    path = "/admin/enrollments",
    responses((status = 200, description = "All enrollments", body = [CourseEnrollment]))
)]
pub async fn list_enrollments(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseEnrollment>>, ApiError> {
    require_admin(&principal)?;
    Ok(Json(state.repo.list_enrollments().await?))
}
