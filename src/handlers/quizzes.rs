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
        AttemptDetail, CompleteQuizRequest, CreateQuizRequest, Quiz, QuizAttempt, QuizView,
        UpdateQuizRequest,
    },
    notify::{QuizDeleted, QuizEvent},
};

/// get_quiz
///
/// [Authenticated Route] A quiz with its ordered question set, redacted for
/// quiz takers: prompts and order only, never the stored correct answers.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz", body = QuizView),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_quiz(
    _principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, ApiError> {
    let view = state
        .repo
        .get_quiz_view(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))?;
    Ok(Json(view))
}

/// complete_quiz
///
/// [Authenticated Route] Scores a submission and records the attempt. The
/// attempt row, its answer rows, and the final score update happen inside one
/// repository transaction.
///
/// *Authorization*: the enrollment must belong to the requesting student
/// (or the caller is an admin).
#[utoipa::path(
    post,
    path = "/quizzes/{id}/complete",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = CompleteQuizRequest,
    responses(
        (status = 201, description = "Attempt recorded", body = QuizAttempt),
        (status = 403, description = "Not your enrollment"),
        (status = 404, description = "Quiz or enrollment not found")
    )
)]
pub async fn complete_quiz(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<CompleteQuizRequest>,
) -> Result<(StatusCode, Json<QuizAttempt>), ApiError> {
    let enrollment = state
        .repo
        .get_enrollment(payload.enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if !can_access(&principal, enrollment.student_id) {
        return Err(ApiError::forbidden("Not your enrollment"));
    }

    let attempt = state
        .repo
        .complete_quiz(quiz_id, payload.enrollment_id, &payload.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// list_my_attempts
///
/// [Authenticated Route] All quiz attempts across the student's enrollments.
#[utoipa::path(
    get,
    path = "/me/attempts",
    responses((status = 200, description = "My attempts", body = [QuizAttempt]))
)]
pub async fn list_my_attempts(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizAttempt>>, ApiError> {
    Ok(Json(
        state.repo.list_attempts_for_student(principal.id).await?,
    ))
}

/// get_attempt
///
/// [Authenticated Route] One attempt with its recorded answers, for reviewing a
/// completed quiz. Ownership is resolved through the attempt's enrollment.
#[utoipa::path(
    get,
    path = "/attempts/{id}",
    params(("id" = Uuid, Path, description = "Attempt ID")),
    responses(
        (status = 200, description = "Attempt with answers", body = AttemptDetail),
        (status = 403, description = "Not your attempt"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_attempt(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptDetail>, ApiError> {
    let detail = state
        .repo
        .get_attempt_detail(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Attempt not found"))?;

    let enrollment = state
        .repo
        .get_enrollment(detail.attempt.enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Attempt not found"))?;

    if !can_access(&principal, enrollment.student_id) {
        return Err(ApiError::forbidden("Not your attempt"));
    }

    Ok(Json(detail))
}

// --- Admin Quiz Management ---

/// create_quiz
///
/// [Admin Route] Creates a quiz with its question set. Exactly one of
/// `course_id` / `lesson_id` must be set. Emits `quiz.created` on success.
#[utoipa::path(
    post,
    path = "/admin/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Created", body = Quiz),
        (status = 400, description = "Invalid scope or passing score")
    )
)]
pub async fn create_quiz(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    require_admin(&principal)?;

    if payload.course_id.is_some() == payload.lesson_id.is_some() {
        return Err(ApiError::validation(
            "exactly one of course_id and lesson_id must be set",
        ));
    }
    if !(0..=100).contains(&payload.passing_score) {
        return Err(ApiError::validation("passing_score must be within 0..=100"));
    }
    if payload.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }

    let quiz = state.repo.create_quiz(payload).await?;
    state.notifier.publish(QuizEvent::Created(quiz.clone()));
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// update_quiz
///
/// [Admin Route] Partial update. Emits `quiz.updated` with the new entity.
#[utoipa::path(
    put,
    path = "/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = UpdateQuizRequest,
    responses(
        (status = 200, description = "Updated", body = Quiz),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_quiz(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<Json<Quiz>, ApiError> {
    require_admin(&principal)?;

    if let Some(passing_score) = payload.passing_score {
        if !(0..=100).contains(&passing_score) {
            return Err(ApiError::validation("passing_score must be within 0..=100"));
        }
    }

    let quiz = state
        .repo
        .update_quiz(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))?;
    state.notifier.publish(QuizEvent::Updated(quiz.clone()));
    Ok(Json(quiz))
}

/// delete_quiz
///
/// [Admin Route] Emits `quiz.deleted` with `{id}` once the row is gone.
#[utoipa::path(
    delete,
    path = "/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_quiz(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&principal)?;

    if state.repo.delete_quiz(id).await? {
        state.notifier.publish(QuizEvent::Deleted(QuizDeleted { id }));
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Quiz not found"))
    }
}
