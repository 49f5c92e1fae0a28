use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::DEFAULT_ROLE;

/// Claims read from an ID token. Only the ones the session needs.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "custom:role", default)]
    role: Option<String>,
}

/// Request-scoped view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub confirmed: bool,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

/// Decodes an ID token into a `Session`.
///
/// Signature is not checked; expiry is. Do not use the result for authorization.
pub fn session_from_id_token(token: &str) -> Result<Session, AppError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;

    let claims = decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AppError::Unauthorized(format!("Invalid ID token: {e}")))?
        .claims;

    let email = claims.email.unwrap_or_default();
    let full_name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.clone());
    let role = claims
        .role
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());

    Ok(Session {
        user_id: claims.sub,
        email,
        full_name,
        role,
        confirmed: true,
    })
}
