use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::provider::{IdentityError, SignInOutcome, SignUpRequest};
use crate::auth::session::{bearer_token, session_from_id_token, Session};
use crate::errors::AppError;
use crate::models::user::{UserView, DEFAULT_ROLE};
use crate::state::AppState;
use crate::users::profiles::{upsert_user, ProfileDetails};
use crate::validation::{non_blank, require};

const DEFAULT_REGION: &str = "New Zealand";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

impl SignupRequest {
    /// `fullName`, then `name`, then `firstName lastName`.
    fn resolved_full_name(&mut self) -> Option<String> {
        non_blank(self.details.full_name.take())
            .or_else(|| non_blank(self.name.take()))
            .or_else(|| {
                let first = non_blank(self.first_name.take()).unwrap_or_default();
                let last = non_blank(self.last_name.take()).unwrap_or_default();
                non_blank(Some(format!("{first} {last}")))
            })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub user_confirmed: bool,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i32,
    pub email: String,
}

/// POST /api/signup
///
/// Registers with the identity provider, then stores the profile keyed by the
/// returned subject id.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(mut req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    const MISSING: &str = "Full name, email, and password are required.";
    let full_name = req
        .resolved_full_name()
        .ok_or_else(|| AppError::Validation(MISSING.to_string()))?;
    let email = require(req.email.take(), MISSING)?;
    let password = require(req.password.take(), MISSING)?;
    let role = non_blank(req.role.take()).unwrap_or_else(|| DEFAULT_ROLE.to_string());

    let outcome = state
        .identity
        .sign_up(&SignUpRequest {
            email: email.clone(),
            password,
            full_name: full_name.clone(),
        })
        .await?;

    let mut details = req.details;
    details.full_name = Some(full_name);
    details.region = non_blank(details.region).or_else(|| Some(DEFAULT_REGION.to_string()));
    let profile = details.into_profile(email, role);

    let (record, _) = upsert_user(state.users.as_ref(), &outcome.user_sub, profile).await?;

    Ok(Json(SignupResponse {
        user_id: outcome.user_sub,
        user_confirmed: outcome.user_confirmed,
        user: UserView::from(&record),
    }))
}

/// POST /api/confirm
pub async fn handle_confirm(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    const MISSING: &str = "Email and confirmation code are required.";
    let email = require(req.email, MISSING)?;
    let code = require(req.code, MISSING)?;

    state.identity.confirm_sign_up(&email, &code).await?;

    Ok(Json(MessageResponse {
        message: "Account confirmed. You can now sign in.".to_string(),
    }))
}

/// POST /api/resend-confirmation
pub async fn handle_resend_confirmation(
    State(state): State<AppState>,
    Json(req): Json<ResendRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = require(req.email, "Email is required")?;

    state.identity.resend_confirmation_code(&email).await?;

    Ok(Json(MessageResponse {
        message: "A new confirmation code has been sent to your email.".to_string(),
    }))
}

/// POST /api/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    const MISSING: &str = "Email and password are required.";
    let email = require(req.email, MISSING)?;
    let password = require(req.password, MISSING)?;

    let outcome = state
        .identity
        .sign_in(&email, &password)
        .await
        .map_err(|e| match e {
            IdentityError::UserNotConfirmed => AppError::UserNotConfirmed(email.clone()),
            other => AppError::Identity(other),
        })?;

    let tokens = match outcome {
        SignInOutcome::Challenge(challenge) => {
            info!("Sign-in for {email} requires challenge {challenge}");
            return Err(AppError::ChallengeRequired(challenge));
        }
        SignInOutcome::Authenticated(tokens) => tokens,
    };

    let (Some(id_token), Some(access_token)) = (tokens.id_token, tokens.access_token) else {
        return Err(AppError::MissingTokens);
    };

    info!("Signed in {email}");

    Ok(Json(LoginResponse {
        id_token,
        access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_in: tokens.expires_in.unwrap_or(3600),
        email,
    }))
}

/// GET /api/session
///
/// Reads the bearer ID token and returns who it belongs to.
pub async fn handle_session(headers: HeaderMap) -> Result<Json<Session>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(session_from_id_token(token)?))
}
