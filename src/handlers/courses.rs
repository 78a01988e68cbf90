use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthPrincipal, require_admin},
    error::ApiError,
    models::{
        Course, CourseModule, CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
        CreateResourceRequest, Lesson, LessonResource, UpdateCourseRequest, UpdateLessonRequest,
        UpdateModuleRequest,
    },
};

/// list_courses
///
/// [Public Route] Lists published courses only; unpublished courses are never
/// visible to anonymous clients.
#[utoipa::path(
    get,
    path = "/courses",
    responses((status = 200, description = "Published courses", body = [Course]))
)]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.repo.list_courses(true).await?))
}

/// get_course
///
/// [Public Route] Single course detail. Unpublished courses read as missing.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = Course),
        (status = 404, description = "Not found or unpublished")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .repo
        .get_course(id)
        .await?
        .filter(|course| course.is_published)
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(Json(course))
}

// --- Admin Course Management ---

/// list_all_courses
///
/// [Admin Route] All courses regardless of publication status.
#[utoipa::path(
    get,
    path = "/admin/courses",
    responses((status = 200, description = "All courses", body = [Course]))
)]
pub async fn list_all_courses(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    require_admin(&principal)?;
    Ok(Json(state.repo.list_courses(false).await?))
}

/// create_course
///
/// [Admin Route] New courses start unpublished.
#[utoipa::path(
    post,
    path = "/admin/courses",
    request_body = CreateCourseRequest,
    responses((status = 201, description = "Created", body = Course))
)]
pub async fn create_course(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    require_admin(&principal)?;
    if payload.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    let course = state.repo.create_course(payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// update_course
///
/// [Admin Route] Partial update, including the publish flag.
#[utoipa::path(
    put,
    path = "/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_course(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, ApiError> {
    require_admin(&principal)?;
    let course = state
        .repo
        .update_course(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(Json(course))
}

/// delete_course
///
/// [Admin Route] Deleting an unknown id is a 404, never a 500.
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_course(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&principal)?;
    if state.repo.delete_course(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Course not found"))
    }
}

/// create_module
///
/// [Admin Route] Appends a module to a course; `order_index` drives display order.
#[utoipa::path(
    post,
    path = "/admin/courses/{id}/modules",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Created", body = CourseModule),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_module(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<(StatusCode, Json<CourseModule>), ApiError> {
    require_admin(&principal)?;
    if payload.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    let module = state.repo.create_module(course_id, payload).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// update_module
///
/// [Admin Route] Partial update; reordering happens via `order_index`.
#[utoipa::path(
    put,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = UpdateModuleRequest,
    responses(
        (status = 200, description = "Updated", body = CourseModule),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_module(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<Json<CourseModule>, ApiError> {
    require_admin(&principal)?;
    let module = state
        .repo
        .update_module(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Module not found"))?;
    Ok(Json(module))
}

/// delete_module
#[utoipa::path(
    delete,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_module(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&principal)?;
    if state.repo.delete_module(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Module not found"))
    }
}

/// create_lesson
#[utoipa::path(
    post,
    path = "/admin/modules/{id}/lessons",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Created", body = Lesson),
        (status = 404, description = "Module not found")
    )
)]
pub async fn create_lesson(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    require_admin(&principal)?;
    if payload.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    let lesson = state.repo.create_lesson(module_id, payload).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// update_lesson
#[utoipa::path(
    put,
    path = "/admin/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Updated", body = Lesson),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_lesson(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLessonRequest>,
) -> Result<Json<Lesson>, ApiError> {
    require_admin(&principal)?;
    let lesson = state
        .repo
        .update_lesson(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))?;
    Ok(Json(lesson))
}

/// delete_lesson
#[utoipa::path(
    delete,
    path = "/admin/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_lesson(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&principal)?;
    if state.repo.delete_lesson(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Lesson not found"))
    }
}

/// add_lesson_resource
///
/// [Admin Route] Attaches a freeform resource (link, file URL) to a lesson.
#[utoipa::path(
    post,
    path = "/admin/lessons/{id}/resources",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Created", body = LessonResource),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn add_lesson_resource(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<LessonResource>), ApiError> {
    require_admin(&principal)?;
    if payload.url.is_empty() {
        return Err(ApiError::validation("url is required"));
    }
    let resource = state.repo.add_lesson_resource(lesson_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// delete_lesson_resource
#[utoipa::path(
    delete,
    path = "/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_lesson_resource(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&principal)?;
    if state.repo.delete_lesson_resource(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Resource not found"))
    }
}
