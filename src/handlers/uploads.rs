use axum::{Json, extract::Multipart, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthPrincipal,
    error::ApiError,
    models::UploadResponse,
    storage::UploadCategory,
};

/// handle_upload
///
/// Shared multipart pipeline for all three upload categories. The size and MIME
/// constraints are enforced before the storage client is ever called, so an
/// invalid body costs no S3 round trip.
async fn handle_upload(
    category: UploadCategory,
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::validation("file field must carry a filename"))?
            .to_string();
        let content_type = field
            .content_type()
            .ok_or_else(|| ApiError::validation("file field must carry a content type"))?
            .to_string();

        if !category.accepts(&content_type) {
            return Err(ApiError::validation(format!(
                "content type '{}' is not allowed for {} uploads",
                content_type,
                category.as_str()
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read upload body: {e}")))?;

        if bytes.len() > category.max_bytes() {
            return Err(ApiError::validation(format!(
                "{} uploads are limited to {} bytes",
                category.as_str(),
                category.max_bytes()
            )));
        }

        // Unique, structured object key: 'uploads/<category>/<uuid>.<ext>'.
        let extension = std::path::Path::new(&filename)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("bin");
        let key = format!(
            "uploads/{}/{}.{}",
            category.as_str(),
            Uuid::new_v4(),
            extension
        );

        let url = state
            .storage
            .put_object(&key, &content_type, bytes.to_vec())
            .await
            .map_err(|e| ApiError::internal(format!("storage upload failed: {e}")))?;

        return Ok(Json(UploadResponse { url, key }));
    }

    Err(ApiError::validation("multipart body must contain a 'file' field"))
}

/// upload_image
///
/// [Authenticated Route] JPEG/PNG/GIF up to 2 MB.
#[utoipa::path(
    post,
    path = "/uploads/image",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Wrong type or oversize")
    )
)]
pub async fn upload_image(
    _principal: AuthPrincipal,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(UploadCategory::Image, &state, multipart).await
}

/// upload_video
///
/// [Authenticated Route] Common video formats up to 100 MB.
#[utoipa::path(
    post,
    path = "/uploads/video",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Wrong type or oversize")
    )
)]
pub async fn upload_video(
    _principal: AuthPrincipal,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(UploadCategory::Video, &state, multipart).await
}

/// upload_document
///
/// [Authenticated Route] PDFs up to 10 MB (CVs and cover letters).
#[utoipa::path(
    post,
    path = "/uploads/document",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Wrong type or oversize")
    )
)]
pub async fn upload_document(
    _principal: AuthPrincipal,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(UploadCategory::Document, &state, multipart).await
}
