use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};

/// RepoError
///
/// Failure type returned by every `Repository` method. The persistence layer
/// classifies database failures once, here, so individual handlers never have to
/// inspect raw sqlx errors.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A unique-constraint violation with a resource-specific client message
    /// (e.g., duplicate enrollment, duplicate username).
    #[error("{0}")]
    Conflict(String),

    /// The targeted row does not exist (or is not visible to the caller).
    #[error("row not found")]
    NotFound,

    /// Any other database failure. Logged, never echoed to clients.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RepoError {
    /// Maps a sqlx error to `Conflict(message)` if it is a unique-constraint
    /// violation, and passes everything else through untouched.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return RepoError::Conflict(message.to_string());
            }
        }
        RepoError::Sqlx(err)
    }

    /// Maps a foreign-key violation to `NotFound`: inserting a child under a
    /// missing parent reads as "parent does not exist" at the API surface.
    pub fn not_found_on_fk(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_foreign_key_violation() {
                return RepoError::NotFound;
            }
        }
        RepoError::Sqlx(err)
    }
}

/// ApiError
///
/// The single HTTP error translation layer. Every handler returns
/// `Result<_, ApiError>`; status codes and body wording are decided here and
/// nowhere else, so they stay consistent across resource types.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),
    // 400 Bad Request: unique-constraint violation with a fixed client message.
    Conflict(String),
    // 401 Unauthorized
    Unauthorized(String),
    // 403 Forbidden
    Forbidden(String),
    // 404 Not Found
    NotFound(String),
    // 500 Internal Server Error: generic body, detail goes to the logs only.
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// The undifferentiated login failure. Used by every login flow so that
    /// unknown username, wrong password, and inactive account are
    /// indistinguishable to the caller.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("invalid credentials".to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Client-safe message. Internal failures are replaced by a generic body;
    /// the underlying cause is already in the logs.
    fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => "An error occurred while processing your request",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
        })
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict(msg) => ApiError::Conflict(msg),
            RepoError::NotFound => ApiError::not_found("Resource not found"),
            RepoError::Sqlx(e) => {
                tracing::error!("database error: {:?}", e);
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!("internal error: {}", detail);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
