//! Shared fixtures for handler and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::admin::moderation::ModerationQueues;
use crate::auth::provider::{
    AuthTokens, IdentityError, IdentityProvider, SignInOutcome, SignUpOutcome, SignUpRequest,
};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::MemoryUserStore;

pub const CONFIRMATION_CODE: &str = "123456";

struct Account {
    sub: String,
    password: String,
    full_name: String,
    confirmed: bool,
}

/// Identity provider that keeps accounts in memory and behaves like the
/// hosted service for the flows the API exercises.
#[derive(Default)]
pub struct ScriptedIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    /// Returned instead of tokens once credentials check out.
    sign_in_outcome: Option<SignInOutcome>,
    /// Every call fails as if no app client id were set.
    unconfigured: bool,
}

impl ScriptedIdentity {
    pub fn with_account(self, email: &str, password: &str, confirmed: bool) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                sub: format!("sub-{email}"),
                password: password.to_string(),
                full_name: "Test User".to_string(),
                confirmed,
            },
        );
        self
    }

    pub fn with_sign_in_outcome(mut self, outcome: SignInOutcome) -> Self {
        self.sign_in_outcome = Some(outcome);
        self
    }

    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    fn check_configured(&self) -> Result<(), IdentityError> {
        if self.unconfigured {
            Err(IdentityError::NotConfigured)
        } else {
            Ok(())
        }
    }
}

fn id_token(sub: &str, email: &str, name: &str) -> String {
    let claims = json!({
        "sub": sub,
        "email": email,
        "name": name,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"scripted"),
    )
    .unwrap()
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
        self.check_configured()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&request.email) {
            return Err(IdentityError::UsernameExists(
                "User already exists".to_string(),
            ));
        }
        let sub = format!("sub-{}", request.email);
        accounts.insert(
            request.email.clone(),
            Account {
                sub: sub.clone(),
                password: request.password.clone(),
                full_name: request.full_name.clone(),
                confirmed: false,
            },
        );
        Ok(SignUpOutcome {
            user_sub: sub,
            user_confirmed: false,
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.check_configured()?;
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(email).ok_or(IdentityError::UserNotFound)?;
        if code != CONFIRMATION_CODE {
            return Err(IdentityError::CodeMismatch(
                "Invalid verification code provided, please try again.".to_string(),
            ));
        }
        account.confirmed = true;
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), IdentityError> {
        self.check_configured()?;
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(IdentityError::UserNotFound)
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, IdentityError> {
        self.check_configured()?;
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.get(email).ok_or(IdentityError::UserNotFound)?;
        if account.password != password {
            return Err(IdentityError::NotAuthorized);
        }
        if !account.confirmed {
            return Err(IdentityError::UserNotConfirmed);
        }
        if let Some(outcome) = &self.sign_in_outcome {
            return Ok(outcome.clone());
        }
        Ok(SignInOutcome::Authenticated(AuthTokens {
            id_token: Some(id_token(&account.sub, email, &account.full_name)),
            access_token: Some(format!("access-{}", account.sub)),
            refresh_token: Some(format!("refresh-{}", account.sub)),
            token_type: None,
            expires_in: None,
        }))
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "STORAGE_BACKEND" => Some("memory".to_string()),
        "RESUME_MAX_BYTES" => Some("4096".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_state(identity: ScriptedIdentity) -> AppState {
    AppState {
        users: Arc::new(MemoryUserStore::new()),
        identity: Arc::new(identity),
        catalog: Arc::new(Catalog::load().unwrap()),
        moderation: Arc::new(ModerationQueues::load().unwrap()),
        config: test_config(),
    }
}

pub fn test_app(identity: ScriptedIdentity) -> Router {
    build_router(test_state(identity))
}

/// Sends one request through a clone of the router and returns the status and
/// decoded JSON body (`Null` when the body is empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A single-file `multipart/form-data` upload in the field `file`.
pub fn upload(file_name: &str, content_type: &str, contents: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "talent-hub-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/resume/parse")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
