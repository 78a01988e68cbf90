mod common;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use std::sync::Arc;

use common::{
    MockRepo, STUDENT_ID, principal_record, test_state, test_state_with_repo,
};
use skillbridge::{
    error::ApiError,
    handlers,
    models::{
        ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterUserRequest, RefreshToken,
        TenantKind,
    },
    storage::MockStorageService,
};

fn login_payload(username: &str, password: &str) -> Json<LoginRequest> {
    Json(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

// --- Undifferentiated 401 across all login failure modes ---

#[tokio::test]
async fn unknown_username_wrong_password_and_inactive_account_share_one_body() {
    // Case 1: unknown username.
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let unknown = handlers::auth::login_user(State(state), login_payload("ghost", "pw"))
        .await
        .unwrap_err();

    // Case 2: known username, wrong password.
    let state = test_state(
        MockRepo {
            principal_by_username: Some(principal_record(
                STUDENT_ID, "youth1", "correct", "student", true,
            )),
            ..MockRepo::default()
        },
        MockStorageService::new(),
    );
    let wrong_password = handlers::auth::login_user(State(state), login_payload("youth1", "nope"))
        .await
        .unwrap_err();

    // Case 3: correct password, deactivated account.
    let state = test_state(
        MockRepo {
            principal_by_username: Some(principal_record(
                STUDENT_ID, "youth1", "correct", "student", false,
            )),
            ..MockRepo::default()
        },
        MockStorageService::new(),
    );
    let inactive = handlers::auth::login_user(State(state), login_payload("youth1", "correct"))
        .await
        .unwrap_err();

    for err in [&unknown, &wrong_password, &inactive] {
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
    // The bodies are byte-identical: no user-enumeration signal.
    assert_eq!(unknown.to_json(), wrong_password.to_json());
    assert_eq!(wrong_password.to_json(), inactive.to_json());
}

#[tokio::test]
async fn user_login_issues_access_and_refresh_tokens() {
    let repo = Arc::new(MockRepo {
        principal_by_username: Some(principal_record(
            STUDENT_ID, "youth1", "correct", "student", true,
        )),
        ..MockRepo::default()
    });
    let state = test_state_with_repo(repo.clone(), MockStorageService::new());

    let Json(response) = handlers::auth::login_user(State(state), login_payload("youth1", "correct"))
        .await
        .unwrap();

    assert!(!response.token.is_empty());
    assert!(response.expires_in > 0);
    assert_eq!(response.account.username, "youth1");
    assert_eq!(response.account.tenant, TenantKind::User);

    // The refresh token in the response is the one persisted.
    let issued = response.refresh_token.expect("youth login carries a refresh token");
    assert_eq!(repo.refresh_tokens_created.lock().unwrap().as_slice(), &[issued]);
}

#[tokio::test]
async fn company_login_has_no_refresh_token() {
    let repo = Arc::new(MockRepo {
        principal_by_username: Some(principal_record(
            common::COMPANY_ID, "acme", "hunter2", "company", true,
        )),
        ..MockRepo::default()
    });
    let state = test_state_with_repo(repo.clone(), MockStorageService::new());

    let Json(response) =
        handlers::auth::login_company(State(state), login_payload("acme", "hunter2"))
            .await
            .unwrap();

    assert_eq!(response.account.tenant, TenantKind::Company);
    assert!(response.refresh_token.is_none());
    assert!(repo.refresh_tokens_created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_empty_fields_is_a_validation_error() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let err = handlers::auth::login_user(State(state), login_payload("", ""))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

// --- Registration ---

#[tokio::test]
async fn register_missing_names_is_rejected() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let payload = RegisterUserRequest {
        username: "youth1".to_string(),
        password: "pw".to_string(),
        ..RegisterUserRequest::default()
    };

    let err = handlers::auth::register_user(State(state), Json(payload))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_creates_user_and_profile() {
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let payload = RegisterUserRequest {
        username: "youth1".to_string(),
        password: "pw".to_string(),
        first_name: "Alex".to_string(),
        last_name: "Berg".to_string(),
        education_level: Some("secondary".to_string()),
        skills: vec!["rust".to_string()],
    };

    let (status, Json(registered)) = handlers::auth::register_user(State(state), Json(payload))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered.user.role, "student");
    assert_eq!(registered.profile.user_id, registered.user.id);
    assert_eq!(registered.profile.first_name, "Alex");
}

// --- Password change ---

#[tokio::test]
async fn wrong_current_password_never_touches_the_stored_hash() {
    let repo = Arc::new(MockRepo {
        principal_by_id: Some(principal_record(
            STUDENT_ID, "youth1", "correct", "student", true,
        )),
        ..MockRepo::default()
    });
    let state = test_state_with_repo(repo.clone(), MockStorageService::new());

    let err = handlers::auth::change_password(
        common::student_principal(),
        State(state),
        Json(ChangePasswordRequest {
            current_password: "wrong".to_string(),
            new_password: "brand-new".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert!(repo.password_updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn correct_current_password_updates_the_hash() {
    let repo = Arc::new(MockRepo {
        principal_by_id: Some(principal_record(
            STUDENT_ID, "youth1", "correct", "student", true,
        )),
        ..MockRepo::default()
    });
    let state = test_state_with_repo(repo.clone(), MockStorageService::new());

    let status = handlers::auth::change_password(
        common::student_principal(),
        State(state),
        Json(ChangePasswordRequest {
            current_password: "correct".to_string(),
            new_password: "brand-new".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    let updates = repo.password_updates.lock().unwrap();
    assert_eq!(updates.as_slice(), &[(TenantKind::User, STUDENT_ID)]);
}

// --- Refresh rotation ---

#[tokio::test]
async fn unknown_or_replayed_refresh_token_is_rejected() {
    // consume_refresh_token returns None for unknown, expired, and revoked alike.
    let state = test_state(MockRepo::default(), MockStorageService::new());
    let err = handlers::auth::refresh_token(
        State(state),
        Json(RefreshRequest {
            refresh_token: "already-used".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotation_issues_a_fresh_pair() {
    let repo = Arc::new(MockRepo {
        consume_refresh_result: Some(RefreshToken {
            token: "old-token".to_string(),
            user_id: STUDENT_ID,
            expires_at: Utc::now() + Duration::days(1),
            revoked: true,
        }),
        principal_by_id: Some(principal_record(
            STUDENT_ID, "youth1", "correct", "student", true,
        )),
        ..MockRepo::default()
    });
    let state = test_state_with_repo(repo.clone(), MockStorageService::new());

    let Json(response) = handlers::auth::refresh_token(
        State(state),
        Json(RefreshRequest {
            refresh_token: "old-token".to_string(),
        }),
    )
    .await
    .unwrap();

    let new_refresh = response.refresh_token.expect("rotation returns a new refresh token");
    assert_ne!(new_refresh, "old-token");
    assert_eq!(
        repo.refresh_tokens_created.lock().unwrap().as_slice(),
        &[new_refresh]
    );
}

// --- Errors never leak internals ---

#[tokio::test]
async fn internal_errors_respond_with_a_generic_body() {
    let err = ApiError::internal("connection refused at 10.0.0.3:5432");
    let body = err.to_json();
    let message = body["message"].as_str().unwrap();
    assert!(!message.contains("10.0.0.3"));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
