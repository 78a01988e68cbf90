use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthPrincipal, require_superadmin},
    error::ApiError,
    models::{CreateApiKeyRequest, ExternalApiKey},
};

/// create_api_key
///
/// [Superadmin Route] Mints a new external API key. The key material is
/// generated server-side and returned exactly once, in this response.
#[utoipa::path(
    post,
    path = "/admin/api-keys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "Created", body = ExternalApiKey),
        (status = 403, description = "Superadmin role required")
    )
)]
pub async fn create_api_key(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ExternalApiKey>), ApiError> {
    require_superadmin(&principal)?;
    if payload.name.is_empty() {
        return Err(ApiError::validation("name is required"));
    }

    // Two concatenated UUIDs: opaque, unguessable, and trivially unique.
    let key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let api_key = state.repo.create_api_key(&payload.name, &key).await?;
    Ok((StatusCode::CREATED, Json(api_key)))
}

/// list_api_keys
///
/// [Superadmin Route] All keys, active and revoked.
#[utoipa::path(
    get,
    path = "/admin/api-keys",
    responses((status = 200, description = "All keys", body = [ExternalApiKey]))
)]
pub async fn list_api_keys(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExternalApiKey>>, ApiError> {
    require_superadmin(&principal)?;
    Ok(Json(state.repo.list_api_keys().await?))
}

/// revoke_api_key
///
/// [Superadmin Route] Idempotent revocation: revoking an already-revoked key
/// succeeds and re-stamps `revoked_at` with the time of this call.
#[utoipa::path(
    post,
    path = "/admin/api-keys/{id}/revoke",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 200, description = "Revoked", body = ExternalApiKey),
        (status = 404, description = "Not found")
    )
)]
pub async fn revoke_api_key(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExternalApiKey>, ApiError> {
    require_superadmin(&principal)?;
    let api_key = state
        .repo
        .revoke_api_key(id)
        .await?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;
    Ok(Json(api_key))
}
