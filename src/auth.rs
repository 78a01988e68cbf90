use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::TenantKind,
    repository::RepositoryState,
};

// Role strings stored in the `role` columns and embedded in token claims.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";

// Fixed access-token lifetime for company/institution/municipality accounts.
const TENANT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// The signed payload embedded in every access token: the principal's identity,
/// role, and tenant family, plus the standard expiry/issue timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the principal's UUID within its tenant table.
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    /// Which account family this token belongs to. Verification re-resolves the
    /// principal in the matching table, so a company token can never act as a user.
    pub tenant: TenantKind,
    /// Expiration time (exp): timestamp after which the token must not be accepted.
    pub exp: usize,
    /// Issued at (iat).
    pub iat: usize,
}

/// issue_token
///
/// Signs an access token for any tenant principal. Company, institution and
/// municipality tokens always get the fixed 24h expiry; youth/user tokens use
/// the externally-configured lifetime. Returns the token plus its lifetime in
/// seconds for the login response body.
pub fn issue_token(
    config: &AppConfig,
    id: Uuid,
    username: &str,
    role: &str,
    tenant: TenantKind,
) -> Result<(String, i64), ApiError> {
    let ttl_hours = match tenant {
        TenantKind::User => config.user_token_ttl_hours,
        _ => TENANT_TOKEN_TTL_HOURS,
    };

    let now = Utc::now();
    let expires_in = Duration::hours(ttl_hours);
    let claims = Claims {
        sub: id,
        username: username.to_string(),
        role: role.to_string(),
        tenant,
        exp: (now + expires_in).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    Ok((token, expires_in.num_seconds()))
}

/// hash_password
///
/// Argon2id with a per-password random salt. The resulting PHC string is what
/// lands in the `password_hash` columns.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

/// verify_password
///
/// Constant result shape: a malformed stored hash verifies as false rather than
/// erroring, so login failure stays undifferentiated.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// AuthPrincipal
///
/// The resolved identity of an authenticated request, regardless of tenant
/// family. Handlers use this for every ownership and role decision.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub tenant: TenantKind,
}

impl AuthPrincipal {
    /// True for youth-side administrative roles.
    pub fn is_admin(&self) -> bool {
        self.tenant == TenantKind::User
            && (self.role == ROLE_ADMIN || self.role == ROLE_SUPERADMIN)
    }

    pub fn is_superadmin(&self) -> bool {
        self.tenant == TenantKind::User && self.role == ROLE_SUPERADMIN
    }
}

/// can_access
///
/// The single row-level access predicate applied by every resource-reading
/// endpoint: self-service (the principal owns the row) or privileged-override
/// (the principal holds an administrative role).
pub fn can_access(principal: &AuthPrincipal, owner_id: Uuid) -> bool {
    principal.id == owner_id || principal.is_admin()
}

/// require_admin
///
/// Guard for the /admin route family.
pub fn require_admin(principal: &AuthPrincipal) -> Result<(), ApiError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator role required"))
    }
}

/// require_superadmin
///
/// Guard for external API key management.
pub fn require_superadmin(principal: &AuthPrincipal) -> Result<(), ApiError> {
    if principal.is_superadmin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Superadmin role required"))
    }
}

/// AuthPrincipal Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthPrincipal usable as a
/// function argument in any authenticated handler.
///
/// The process:
/// 1. Dependency resolution: Repository and AppConfig from the application state.
/// 2. Local bypass: development-time youth access via the 'x-user-id' header.
/// 3. Token validation: Bearer token extraction and JWT decoding.
/// 4. DB lookup: re-resolve the principal in its tenant table; missing or
///    deactivated principals are rejected even if the token is still valid.
///
/// Rejection: 401 via ApiError on any failure.
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local Development Bypass: a known user UUID in 'x-user-id' authenticates
        // as that youth account. Guarded by the Env check; never active in production.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Ok(Some(record)) = repo
                            .find_principal_by_id(TenantKind::User, user_id)
                            .await
                        {
                            if record.is_active {
                                return Ok(AuthPrincipal {
                                    id: record.id,
                                    username: record.username,
                                    role: record.role,
                                    tenant: TenantKind::User,
                                });
                            }
                        }
                    }
                }
            }
        }
        // Falls through to standard JWT validation if the bypass did not resolve.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))?;

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let claims = token_data.claims;

        // Final verification against the database: the principal must still exist
        // and be active in the tenant table named by the token.
        let record = repo
            .find_principal_by_id(claims.tenant, claims.sub)
            .await
            .map_err(|e| {
                tracing::error!("principal lookup failed: {e}");
                ApiError::unauthorized("Invalid or expired token")
            })?
            .filter(|record| record.is_active)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthPrincipal {
            id: record.id,
            username: record.username,
            role: record.role,
            tenant: claims.tenant,
        })
    }
}
