//! API error envelope and translation from domain/auth failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::{AuthError, DomainError};

/// Broad class of an error, serialized as `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    ConflictError,
    NotFoundError,
    TimeoutError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::TimeoutError => write!(f, "timeout_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// `{"error": {...}}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// Request body could not be read as the expected JSON document
    pub fn invalid_payload() -> Self {
        Self::bad_request("invalid payload").with_code("invalid_payload")
    }

    /// Handler ran without an authenticated identity in the request
    pub fn unauthenticated() -> Self {
        Self::unauthorized("unauthenticated").with_code("unauthenticated")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

/// Client-facing message for an auth failure; internal detail stays in logs
fn public_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidInput(_) => "email and password are required",
        AuthError::DuplicateEmail => "email already registered",
        AuthError::InvalidCredentials => "invalid credentials",
        AuthError::MissingCredential => "missing authorization header",
        AuthError::MalformedCredential(_) => "invalid authorization header",
        AuthError::UnsupportedAlgorithm(_) | AuthError::InvalidSignature(_) | AuthError::Expired => {
            "invalid token"
        }
        AuthError::InvalidSubjectClaim(_) => "invalid subject claim",
        AuthError::UnknownIdentity(_) => "user not found",
        AuthError::StoreFailure(_) | AuthError::ResolutionFailure(_) => "database error",
        AuthError::HashingFailure(_) => "failed to hash password",
        AuthError::TokenCreationFailure(_) | AuthError::SigningFailure(_) => {
            "failed to create token"
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = public_message(&err);
        let code = err.code();

        let api_error = match &err {
            _ if err.is_internal() => {
                error!(code, error = %err, "Internal authentication failure");
                Self::internal(message)
            }
            AuthError::InvalidInput(_) => Self::bad_request(message),
            AuthError::DuplicateEmail => Self::conflict(message),
            _ => {
                warn!(code, error = %err, "Authentication rejected");
                Self::unauthorized(message)
            }
        };

        api_error.with_code(code)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => {
                error!(error = %err, "Internal error");
                Self::internal("internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("invalid payload");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "invalid payload");
        assert!(err.response.error.code.is_none());
    }

    #[test]
    fn test_client_auth_errors() {
        let cases = [
            (AuthError::InvalidInput("email empty".into()), StatusCode::BAD_REQUEST),
            (AuthError::DuplicateEmail, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::MissingCredential, StatusCode::UNAUTHORIZED),
            (AuthError::Expired, StatusCode::UNAUTHORIZED),
            (AuthError::UnknownIdentity(7), StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            let code = err.code();
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.response.error.code.as_deref(), Some(code));
        }
    }

    #[test]
    fn test_token_failures_share_a_message() {
        let expired = ApiError::from(AuthError::Expired);
        let forged = ApiError::from(AuthError::InvalidSignature("InvalidSignature".into()));
        let alg = ApiError::from(AuthError::UnsupportedAlgorithm("RS256".into()));

        assert_eq!(expired.response.error.message, "invalid token");
        assert_eq!(forged.response.error.message, "invalid token");
        assert_eq!(alg.response.error.message, "invalid token");
        assert_eq!(alg.response.error.code.as_deref(), Some("unsupported_algorithm"));
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError::from(AuthError::ResolutionFailure(DomainError::storage(
            "disk I/O error at /var/lib/members.db",
        )));

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response.error.error_type, ApiErrorType::ServerError);
        assert_eq!(err.response.error.message, "database error");
        assert!(!err.to_string().contains("/var/lib"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let not_found = ApiError::from(DomainError::not_found("User '3' not found"));
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let storage = ApiError::from(DomainError::storage("connection reset"));
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.response.error.message, "internal server error");
    }

    #[test]
    fn test_serialized_envelope() {
        let err = ApiError::unauthenticated();
        let body = serde_json::to_value(&err.response).unwrap();

        assert_eq!(body["error"]["message"], "unauthenticated");
        assert_eq!(body["error"]["type"], "authentication_error");
        assert_eq!(body["error"]["code"], "unauthenticated");
    }
}
