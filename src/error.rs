// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(String),

    // 401 Unauthorized
    Unauthorized(String),
    InvalidCredentials,
    InvalidOrExpiredToken,
    TokenRevoked,
    IpChanged,
    TokenDataMismatch,

    // 403 Forbidden
    AccountDisabled,
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
    NotFoundOrForbidden(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable (cache or relational store unreachable)
    StoreUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::InvalidCredentials => 401,
            ApiError::InvalidOrExpiredToken => 401,
            ApiError::TokenRevoked => 401,
            ApiError::IpChanged => 401,
            ApiError::TokenDataMismatch => 401,
            ApiError::AccountDisabled => 403,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::NotFoundOrForbidden(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::StoreUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::InvalidCredentials => "invalid account or password",
            ApiError::InvalidOrExpiredToken => "token is invalid or expired",
            ApiError::TokenRevoked => "token is no longer valid, please sign in again",
            ApiError::IpChanged => "login IP has changed, please sign in again",
            ApiError::TokenDataMismatch => "token does not match the session",
            ApiError::AccountDisabled => "account has been disabled",
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::NotFoundOrForbidden(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::StoreUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            ApiError::TokenRevoked => "TOKEN_REVOKED",
            ApiError::IpChanged => "IP_CHANGED",
            ApiError::TokenDataMismatch => "TOKEN_DATA_MISMATCH",
            ApiError::AccountDisabled => "ACCOUNT_DISABLED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::NotFoundOrForbidden(_) => "NOT_FOUND_OR_FORBIDDEN",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::StoreUnavailable(_) => "TRANSIENT_STORE_FAILURE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
        })
    }
}

// Static constructor methods for the message-carrying variants
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
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

    pub fn not_found_or_forbidden(message: impl Into<String>) -> Self {
        ApiError::NotFoundOrForbidden(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        ApiError::StoreUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<crate::auth::authority::AuthError> for ApiError {
    fn from(err: crate::auth::authority::AuthError) -> Self {
        use crate::auth::authority::AuthError;
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::AccountDisabled => ApiError::AccountDisabled,
            AuthError::InvalidOrExpiredToken => ApiError::InvalidOrExpiredToken,
            AuthError::TokenRevoked => ApiError::TokenRevoked,
            AuthError::IpChanged => ApiError::IpChanged,
            AuthError::TokenDataMismatch => ApiError::TokenDataMismatch,
            AuthError::SessionStore(e) => {
                tracing::error!("session store error: {}", e);
                ApiError::store_unavailable("session store temporarily unavailable")
            }
            AuthError::CredentialStore(e) => {
                tracing::error!("credential store error: {}", e);
                ApiError::store_unavailable("credential store temporarily unavailable")
            }
            AuthError::Token(e) => {
                tracing::error!("token issue error: {}", e);
                ApiError::internal_server_error("failed to issue token")
            }
        }
    }
}

impl From<crate::database::catalog::CatalogError> for ApiError {
    fn from(err: crate::database::catalog::CatalogError) -> Self {
        use crate::database::catalog::CatalogError;
        match err {
            CatalogError::NotFound => ApiError::not_found("record not found"),
            CatalogError::Sqlx(e) => match e {
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                    tracing::error!("database unreachable: {}", e);
                    ApiError::store_unavailable("database temporarily unavailable")
                }
                other => {
                    // Don't expose internal SQL errors to clients
                    tracing::error!("database query error: {}", other);
                    ApiError::internal_server_error("an error occurred while processing your request")
                }
            },
            CatalogError::Backend(msg) => {
                tracing::error!("catalog backend error: {}", msg);
                ApiError::store_unavailable("store temporarily unavailable")
            }
        }
    }
}

impl From<crate::services::product_service::ProductError> for ApiError {
    fn from(err: crate::services::product_service::ProductError) -> Self {
        use crate::services::product_service::ProductError;
        match err {
            ProductError::CategoryNotFoundOrForbidden => {
                ApiError::not_found_or_forbidden("category not found or access denied")
            }
            ProductError::NotFoundOrForbidden => {
                ApiError::not_found_or_forbidden("product not found or access denied")
            }
            ProductError::UnknownSku(id) => ApiError::not_found_or_forbidden(format!(
                "sku {} does not belong to this product",
                id
            )),
            ProductError::Store(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
