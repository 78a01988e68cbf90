mod common;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{Request, StatusCode},
};

use common::{MockRepo, student_principal, test_state};
use skillbridge::{handlers, storage::MockStorageService};

const BOUNDARY: &str = "test-boundary";

/// Builds the multipart body the browser would send for one 'file' field.
fn multipart_request(field_name: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri("/uploads")
        .method("POST")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn multipart_from(request: Request<Body>) -> Multipart {
    Multipart::from_request(request, &()).await.unwrap()
}

#[tokio::test]
async fn image_upload_returns_a_public_url() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let request = multipart_request("file", "avatar.png", "image/png", b"pngbytes");

    let response = handlers::uploads::upload_image(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap();

    let upload = response.0;
    assert!(upload.key.starts_with("uploads/images/"));
    assert!(upload.key.ends_with(".png"));
    assert!(upload.url.starts_with("http://localhost:9000/mock-bucket/"));
    assert!(upload.url.contains(&upload.key));
}

#[tokio::test]
async fn disallowed_mime_type_is_rejected_before_storage() {
    // A failing storage proves the handler never got that far: a storage call
    // would have surfaced as a 500, not a 400.
    let state = test_state(MockRepo::default(), MockStorageService::new_failing());
    let request = multipart_request("file", "notes.txt", "text/plain", b"hello");

    let err = handlers::uploads::upload_image(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversize_image_is_rejected_before_storage() {
    let state = test_state(MockRepo::default(), MockStorageService::new_failing());
    // One byte past the 2 MB image cap.
    let oversized = vec![0u8; 2 * 1024 * 1024 + 1];
    let request = multipart_request("file", "big.png", "image/png", &oversized);

    let err = handlers::uploads::upload_image(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_uploads_accept_only_pdf() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let request = multipart_request("file", "cv.pdf", "application/pdf", b"%PDF-1.7");

    let response = handlers::uploads::upload_document(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap();
    assert!(response.0.key.starts_with("uploads/documents/"));

    // A PNG posing as a document is rejected.
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let request = multipart_request("file", "cv.png", "image/png", b"pngbytes");
    let err = handlers::uploads::upload_document(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_file_field_is_a_validation_error() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let request = multipart_request("attachment", "avatar.png", "image/png", b"pngbytes");

    let err = handlers::uploads::upload_image(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_surfaces_as_internal_error() {
    let state = test_state(MockRepo::default(), MockStorageService::new_failing());
    let request = multipart_request("file", "avatar.png", "image/png", b"pngbytes");

    let err = handlers::uploads::upload_image(
        student_principal(),
        State(state),
        multipart_from(request).await,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
