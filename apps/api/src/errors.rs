use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::auth::provider::IdentityError;
use crate::storage::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User {0} is not confirmed")]
    UserNotConfirmed(String),

    #[error("Challenge required: {0}")]
    ChallengeRequired(String),

    #[error("Identity provider returned no tokens")]
    MissingTokens,

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status, machine code, human message and any extra fields merged into the error body.
    fn parts(&self) -> (StatusCode, String, String, Map<String, Value>) {
        let mut extra = Map::new();
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::UserNotConfirmed(email) => {
                extra.insert("email".to_string(), Value::String(email.clone()));
                (
                    StatusCode::CONFLICT,
                    "USER_NOT_CONFIRMED",
                    "Account has not been confirmed yet".to_string(),
                )
            }
            AppError::ChallengeRequired(challenge) => {
                extra.insert("challenge".to_string(), Value::String(challenge.clone()));
                (
                    StatusCode::CONFLICT,
                    "CHALLENGE_REQUIRED",
                    "Challenge required.".to_string(),
                )
            }
            AppError::MissingTokens => {
                tracing::error!("Identity provider response carried no tokens");
                (
                    StatusCode::BAD_GATEWAY,
                    "MISSING_TOKENS",
                    "Missing tokens from identity provider.".to_string(),
                )
            }
            AppError::Identity(e) => return identity_parts(e),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                extra.insert("details".to_string(), Value::String(e.to_string()));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };
        (status, code.to_string(), message, extra)
    }
}

fn identity_parts(e: &IdentityError) -> (StatusCode, String, String, Map<String, Value>) {
    let (status, code) = match e {
        IdentityError::NotConfigured => {
            (StatusCode::INTERNAL_SERVER_ERROR, "IDENTITY_NOT_CONFIGURED".to_string())
        }
        IdentityError::UserNotConfirmed => (StatusCode::CONFLICT, "USER_NOT_CONFIRMED".to_string()),
        IdentityError::NotAuthorized => (StatusCode::UNAUTHORIZED, "NOT_AUTHORIZED".to_string()),
        IdentityError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND".to_string()),
        IdentityError::UsernameExists(_) => (StatusCode::CONFLICT, "USERNAME_EXISTS".to_string()),
        IdentityError::CodeMismatch(_) => (StatusCode::BAD_REQUEST, "CODE_MISMATCH".to_string()),
        IdentityError::ExpiredCode(_) => (StatusCode::BAD_REQUEST, "EXPIRED_CODE".to_string()),
        IdentityError::InvalidPassword(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_PASSWORD".to_string())
        }
        IdentityError::InvalidParameter(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_PARAMETER".to_string())
        }
        IdentityError::SecretHashRequired => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CLIENT_SECRET_REQUIRED".to_string(),
        ),
        IdentityError::Upstream { code, .. } => {
            tracing::error!("Identity provider error: {e}");
            let code = if code.is_empty() {
                "AUTH_ERROR".to_string()
            } else {
                code.clone()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, code)
        }
    };
    (status, code, e.user_message(), Map::new())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, extra) = self.parts();

        let mut error = Map::new();
        error.insert("code".to_string(), Value::String(code));
        error.insert("message".to_string(), Value::String(message));
        error.extend(extra);

        let body = Json(json!({ "error": error }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let (status, code, _, _) = AppError::Validation("x".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_unconfirmed_and_bad_password_are_distinguishable() {
        let (unconfirmed, unconfirmed_code, _, extra) =
            AppError::UserNotConfirmed("a@b.co".into()).parts();
        let (bad_password, bad_password_code, _, _) =
            AppError::Identity(IdentityError::NotAuthorized).parts();

        assert_eq!(unconfirmed, StatusCode::CONFLICT);
        assert_eq!(bad_password, StatusCode::UNAUTHORIZED);
        assert_ne!(unconfirmed_code, bad_password_code);
        assert_eq!(extra.get("email"), Some(&Value::String("a@b.co".into())));
    }

    #[test]
    fn test_storage_error_passes_details_through() {
        let err = AppError::Storage(StoreError::Backend("ResourceNotFoundException".into()));
        let (status, code, _, extra) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "STORAGE_ERROR");
        let details = extra.get("details").and_then(|v| v.as_str()).unwrap();
        assert!(details.contains("ResourceNotFoundException"));
    }

    #[test]
    fn test_upstream_identity_error_uses_exception_name() {
        let err = AppError::Identity(IdentityError::Upstream {
            code: "TooManyRequestsException".into(),
            message: "Slow down".into(),
        });
        let (status, code, message, _) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "TooManyRequestsException");
        assert_eq!(message, "Slow down");
    }

    #[test]
    fn test_challenge_carries_name() {
        let (status, _, _, extra) =
            AppError::ChallengeRequired("NEW_PASSWORD_REQUIRED".into()).parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            extra.get("challenge"),
            Some(&Value::String("NEW_PASSWORD_REQUIRED".into()))
        );
    }
}
