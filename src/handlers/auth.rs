use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{self, AuthPrincipal},
    error::ApiError,
    models::{
        AccountSummary, ChangePasswordRequest, LoginRequest, LoginResponse, Profile,
        RefreshRequest, RegisterUserRequest, RegisteredUser, TenantAccount, TenantKind,
        UpdateProfileRequest,
    },
};

/// login_flow
///
/// The single login/verify/issue-token routine shared by all four tenant
/// families. Lookup miss, inactive account, and hash mismatch all collapse into
/// the same undifferentiated 401, so the API never leaks which usernames exist.
async fn login_flow(
    state: &AppState,
    kind: TenantKind,
    payload: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    let record = state
        .repo
        .find_principal_by_username(kind, &payload.username)
        .await?
        .filter(|record| record.is_active)
        .ok_or_else(ApiError::invalid_credentials)?;

    if !auth::verify_password(&payload.password, &record.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    let (token, expires_in) =
        auth::issue_token(&state.config, record.id, &record.username, &record.role, kind)?;

    // Youth sessions additionally get a single-use refresh token.
    let refresh_token = if kind == TenantKind::User {
        let refresh = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(state.config.refresh_token_ttl_days);
        state
            .repo
            .create_refresh_token(record.id, &refresh, expires_at)
            .await?;
        Some(refresh)
    } else {
        None
    };

    Ok(LoginResponse {
        token,
        expires_in,
        refresh_token,
        account: AccountSummary {
            id: record.id,
            username: record.username,
            role: record.role,
            tenant: kind,
        },
    })
}

/// login_user
///
/// [Public Route] Youth/user login. Issues an access token plus a refresh token.
#[utoipa::path(
    post,
    path = "/auth/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(login_flow(&state, TenantKind::User, payload).await?))
}

/// login_company
///
/// [Public Route] Company login. 24h token, no refresh token.
#[utoipa::path(
    post,
    path = "/auth/company/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_company(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(login_flow(&state, TenantKind::Company, payload).await?))
}

/// login_institution
///
/// [Public Route] Institution login.
#[utoipa::path(
    post,
    path = "/auth/institution/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_institution(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(
        login_flow(&state, TenantKind::Institution, payload).await?,
    ))
}

/// login_municipality
///
/// [Public Route] Municipality login.
#[utoipa::path(
    post,
    path = "/auth/municipality/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_municipality(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(
        login_flow(&state, TenantKind::Municipality, payload).await?,
    ))
}

/// register_user
///
/// [Public Route] Youth registration. The user row and its profile are created
/// in a single transaction; a duplicate username surfaces as a 400 Conflict.
#[utoipa::path(
    post,
    path = "/auth/user/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredUser),
        (status = 400, description = "Missing fields or duplicate username")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }
    if payload.first_name.is_empty() || payload.last_name.is_empty() {
        return Err(ApiError::validation("first_name and last_name are required"));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let (user, profile) = state.repo.register_user(&password_hash, &payload).await?;

    Ok((StatusCode::CREATED, Json(RegisteredUser { user, profile })))
}

/// refresh_token
///
/// [Public Route] Rotates a youth refresh token. The presented token is revoked
/// atomically; replaying it after rotation yields a 401.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Unknown, expired or already used token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let consumed = state
        .repo
        .consume_refresh_token(&payload.refresh_token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    let record = state
        .repo
        .find_principal_by_id(TenantKind::User, consumed.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    let (token, expires_in) = auth::issue_token(
        &state.config,
        record.id,
        &record.username,
        &record.role,
        TenantKind::User,
    )?;

    let refresh = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(state.config.refresh_token_ttl_days);
    state
        .repo
        .create_refresh_token(record.id, &refresh, expires_at)
        .await?;

    Ok(Json(LoginResponse {
        token,
        expires_in,
        refresh_token: Some(refresh),
        account: AccountSummary {
            id: record.id,
            username: record.username,
            role: record.role,
            tenant: TenantKind::User,
        },
    }))
}

/// change_password
///
/// [Authenticated Route] Works for every tenant family. The current password is
/// re-verified before the replacement is hashed; a wrong current password never
/// mutates the stored hash.
#[utoipa::path(
    put,
    path = "/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password incorrect")
    )
)]
pub async fn change_password(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.new_password.is_empty() {
        return Err(ApiError::validation("new_password is required"));
    }

    let record = state
        .repo
        .find_principal_by_id(principal.tenant, principal.id)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !auth::verify_password(&payload.current_password, &record.password_hash) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let new_hash = auth::hash_password(&payload.new_password)?;
    state
        .repo
        .update_password_hash(principal.tenant, principal.id, &new_hash)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// get_me
///
/// [Authenticated Route] The authenticated principal's non-secret identity.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Current principal", body = AccountSummary))
)]
pub async fn get_me(principal: AuthPrincipal) -> Json<AccountSummary> {
    Json(AccountSummary {
        id: principal.id,
        username: principal.username,
        role: principal.role,
        tenant: principal.tenant,
    })
}

/// get_my_organisation
///
/// [Authenticated Route] The organisation record behind a company, institution
/// or municipality session. Youth accounts have no organisation row.
#[utoipa::path(
    get,
    path = "/me/organisation",
    responses(
        (status = 200, description = "Organisation record", body = TenantAccount),
        (status = 404, description = "No organisation for this principal")
    )
)]
pub async fn get_my_organisation(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<TenantAccount>, ApiError> {
    let account = state
        .repo
        .get_tenant_account(principal.tenant, principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organisation not found"))?;
    Ok(Json(account))
}

/// get_my_profile
///
/// [Authenticated Route] The youth account's profile. Organisation accounts
/// have no profile row, so they get a 404 here.
#[utoipa::path(
    get,
    path = "/me/profile",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 404, description = "No profile for this principal")
    )
)]
pub async fn get_my_profile(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .repo
        .get_profile(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

/// update_my_profile
///
/// [Authenticated Route] Partial profile update; only provided fields change.
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 404, description = "No profile for this principal")
    )
)]
pub async fn update_my_profile(
    principal: AuthPrincipal,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .repo
        .update_profile(principal.id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}
