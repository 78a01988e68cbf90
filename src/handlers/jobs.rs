use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthPrincipal,
    error::ApiError,
    models::{CreateJobRequest, Job, TenantKind, UpdateJobRequest},
};

/// list_jobs
///
/// [Public Route] Open job postings, newest first.
#[utoipa::path(
    get,
    path = "/jobs",
    responses((status = 200, description = "Open jobs", body = [Job]))
)]
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, ApiError> {
    Ok(Json(state.repo.list_open_jobs().await?))
}

/// get_job
///
/// [Public Route] Single posting detail.
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Found", body = Job),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    let job = state
        .repo
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// create_job
///
/// [Authenticated Route] Company accounts publish postings under their own id.
#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Created", body = Job),
        (status = 403, description = "Not a company account")
    )
)]
pub async fn create_job(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    if principal.tenant != TenantKind::Company {
        return Err(ApiError::forbidden("Only company accounts can post jobs"));
    }
    if payload.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    let job = state.repo.create_job(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// update_job
///
/// [Authenticated Route] Owner-Only: the repository query matches on
/// company_id, so a non-owner sees the same 404 as a missing posting.
#[utoipa::path(
    put,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated", body = Job),
        (status = 404, description = "Not found or not the owner")
    )
)]
pub async fn update_job(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<Job>, ApiError> {
    if principal.tenant != TenantKind::Company {
        return Err(ApiError::forbidden("Only company accounts can edit jobs"));
    }
    let job = state
        .repo
        .update_job(id, principal.id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// delete_job
///
/// [Authenticated Route] Owner-Only removal.
#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not the owner")
    )
)]
pub async fn delete_job(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if principal.tenant != TenantKind::Company {
        return Err(ApiError::forbidden("Only company accounts can delete jobs"));
    }
    if state.repo.delete_job(id, principal.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Job not found"))
    }
}
