//! API error handling
//!
//! Maps the gateway error taxonomy onto HTTP statuses. Internal failures log
//! their detail and return a generic message; nothing sensitive leaves the
//! process, and nothing ever silently approves.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use relay_auth::AuthError;
use relay_db::DbError;
use relay_policy::PolicyError;
use relay_types::RelayError;

/// API errors with their HTTP mapping
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid input or a replayed seal
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid, or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (tenant mismatch)
    #[error("{0}")]
    Forbidden(String),

    /// Unknown org, seal, or manifest
    #[error("{0}")]
    NotFound(String),

    /// Policy evaluator unreachable or malformed; the gateway fails closed
    #[error("Policy engine unavailable: {0}")]
    PolicyUnavailable(String),

    /// Anything unexpected; detail goes to the logs only
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PolicyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body returned for every error
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: true,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        tracing::error!(error = %e, "Database error");
        ApiError::Internal("Internal server error".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Config(msg) => {
                tracing::error!(error = %msg, "Auth configuration error");
                ApiError::Internal("Internal server error".to_string())
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(e: PolicyError) -> Self {
        ApiError::PolicyUnavailable(e.to_string())
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<relay_crypto::CryptoError> for ApiError {
    fn from(e: relay_crypto::CryptoError) -> Self {
        tracing::error!(error = %e, "Seal signing error");
        ApiError::Internal("Internal server error".to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
