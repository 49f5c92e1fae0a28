//! Identity provider seam. Handlers only ever see `IdentityProvider` and
//! `IdentityError`; the Cognito specifics live in `cognito.rs`.

use async_trait::async_trait;
use thiserror::Error;

/// Provider failures, classified by the upstream exception name.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("identity provider client id is not configured")]
    NotConfigured,

    #[error("user is not confirmed")]
    UserNotConfirmed,

    #[error("incorrect username or password")]
    NotAuthorized,

    #[error("user not found")]
    UserNotFound,

    #[error("username exists: {0}")]
    UsernameExists(String),

    #[error("code mismatch: {0}")]
    CodeMismatch(String),

    #[error("expired code: {0}")]
    ExpiredCode(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The app client was created with a secret, which password sign-in from this service cannot supply.
    #[error("app client requires a secret hash")]
    SecretHashRequired,

    #[error("{code}: {message}")]
    Upstream { code: String, message: String },
}

impl IdentityError {
    /// Maps an upstream exception name (e.g. `UserNotConfirmedException`) and
    /// its message onto a variant. Unknown names pass through as `Upstream`.
    pub fn from_exception(code: Option<&str>, message: Option<&str>) -> Self {
        let msg = message.unwrap_or_default().to_string();
        match code.unwrap_or_default() {
            "UserNotConfirmedException" => IdentityError::UserNotConfirmed,
            "NotAuthorizedException" => IdentityError::NotAuthorized,
            "UserNotFoundException" => IdentityError::UserNotFound,
            "UsernameExistsException" => IdentityError::UsernameExists(msg),
            "CodeMismatchException" => IdentityError::CodeMismatch(msg),
            "ExpiredCodeException" => IdentityError::ExpiredCode(msg),
            "InvalidPasswordException" => IdentityError::InvalidPassword(msg),
            "InvalidParameterException" if msg.to_ascii_uppercase().contains("SECRET_HASH") => {
                IdentityError::SecretHashRequired
            }
            "InvalidParameterException" => IdentityError::InvalidParameter(msg),
            other => IdentityError::Upstream {
                code: other.to_string(),
                message: msg,
            },
        }
    }

    /// Message shown to API callers.
    pub fn user_message(&self) -> String {
        let or = |msg: &str, fallback: &str| {
            if msg.is_empty() {
                fallback.to_string()
            } else {
                msg.to_string()
            }
        };
        match self {
            IdentityError::NotConfigured => "COGNITO_CLIENT_ID missing.".to_string(),
            IdentityError::UserNotConfirmed => "Account has not been confirmed yet.".to_string(),
            IdentityError::NotAuthorized => "Incorrect username or password.".to_string(),
            IdentityError::UserNotFound => "User not found.".to_string(),
            IdentityError::UsernameExists(m) => or(m, "An account with this email already exists."),
            IdentityError::CodeMismatch(m) => or(m, "Invalid confirmation code."),
            IdentityError::ExpiredCode(m) => or(m, "Confirmation code has expired."),
            IdentityError::InvalidPassword(m) => or(m, "Password does not meet requirements."),
            IdentityError::InvalidParameter(m) => or(m, "Invalid request parameter."),
            IdentityError::SecretHashRequired => {
                "Your app client has a secret. Use a web client with NO secret for browser sign-in."
                    .to_string()
            }
            IdentityError::Upstream { message, .. } => or(message, "Authentication failed."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    /// Stable subject id; used as the users-table key.
    pub user_sub: String,
    pub user_confirmed: bool,
}

/// Tokens as returned by the provider. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthTokens {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    Authenticated(AuthTokens),
    /// The provider wants another step first (e.g. `NEW_PASSWORD_REQUIRED`).
    Challenge(String),
}

/// Username/password identity operations.
///
/// Carried in `AppState` as `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError>;

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError>;

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, IdentityError>;
}
