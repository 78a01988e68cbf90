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
    models::{Certificate, IssueCertificateRequest},
};

/// list_my_certificates
///
/// [Authenticated Route] Certificates earned by the requesting student.
#[utoipa::path(
    get,
    path = "/me/certificates",
    responses((status = 200, description = "My certificates", body = [Certificate]))
)]
pub async fn list_my_certificates(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<Certificate>>, ApiError> {
    Ok(Json(
        state
            .repo
            .list_certificates_for_student(principal.id)
            .await?,
    ))
}

/// get_certificate
///
/// [Authenticated Route] Single certificate, self-service or admin override.
#[utoipa::path(
    get,
    path = "/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Found", body = Certificate),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_certificate(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Certificate>, ApiError> {
    let certificate = state
        .repo
        .get_certificate(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))?;

    if !can_access(&principal, certificate.student_id) {
        return Err(ApiError::forbidden("Not your certificate"));
    }

    Ok(Json(certificate))
}

/// issue_certificate
///
/// [Admin Route] Issues a course certificate to a student.
#[utoipa::path(
    post,
    path = "/admin/certificates",
    request_body = IssueCertificateRequest,
    responses(
        (status = 201, description = "Issued", body = Certificate),
        (status = 404, description = "Student or course not found")
    )
)]
pub async fn issue_certificate(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<IssueCertificateRequest>,
) -> Result<(StatusCode, Json<Certificate>), ApiError> {
    require_admin(&principal)?;
    let certificate = state
        .repo
        .issue_certificate(payload.student_id, payload.course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}
