use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{AttributeType, AuthFlowType},
    Client,
};
use tracing::{info, warn};

use crate::auth::provider::{
    AuthTokens, IdentityError, IdentityProvider, SignInOutcome, SignUpOutcome, SignUpRequest,
};

/// Cognito user pool accessed through a public app client (no client secret).
#[derive(Clone)]
pub struct CognitoIdentityProvider {
    client: Client,
    client_id: Option<String>,
}

impl CognitoIdentityProvider {
    pub fn new(client: Client, client_id: Option<String>) -> Self {
        if client_id.is_none() {
            warn!("COGNITO_CLIENT_ID is not set; auth endpoints will answer with a configuration error");
        }
        Self { client, client_id }
    }

    fn client_id(&self) -> Result<&str, IdentityError> {
        self.client_id.as_deref().ok_or(IdentityError::NotConfigured)
    }
}

/// Classifies an SDK failure by its exception name. Transport failures carry no
/// name and surface as `Upstream` with the full error context as message.
fn classify<E, R>(err: SdkError<E, R>) -> IdentityError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => IdentityError::from_exception(Some(code), err.message()),
        None => IdentityError::Upstream {
            code: String::new(),
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, IdentityError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| IdentityError::InvalidParameter(e.to_string()))
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
        let output = self
            .client
            .sign_up()
            .client_id(self.client_id()?)
            .username(&request.email)
            .password(&request.password)
            .user_attributes(attribute("name", &request.full_name)?)
            .user_attributes(attribute("email", &request.email)?)
            .send()
            .await
            .map_err(classify)?;

        info!("Signed up {} (confirmed: {})", request.email, output.user_confirmed());

        Ok(SignUpOutcome {
            user_sub: output.user_sub().to_string(),
            user_confirmed: output.user_confirmed(),
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.client
            .confirm_sign_up()
            .client_id(self.client_id()?)
            .username(email)
            .confirmation_code(code)
            .send()
            .await
            .map_err(classify)?;
        info!("Confirmed sign-up for {email}");
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), IdentityError> {
        self.client
            .resend_confirmation_code()
            .client_id(self.client_id()?)
            .username(email)
            .send()
            .await
            .map_err(classify)?;
        info!("Resent confirmation code to {email}");
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, IdentityError> {
        let output = self
            .client
            .initiate_auth()
            .client_id(self.client_id()?)
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(classify)?;

        if let Some(challenge) = output.challenge_name() {
            return Ok(SignInOutcome::Challenge(challenge.as_str().to_string()));
        }

        let tokens = output
            .authentication_result()
            .map(|result| AuthTokens {
                id_token: result.id_token().map(String::from),
                access_token: result.access_token().map(String::from),
                refresh_token: result.refresh_token().map(String::from),
                token_type: result.token_type().map(String::from),
                expires_in: Some(result.expires_in()).filter(|secs| *secs > 0),
            })
            .unwrap_or_default();

        Ok(SignInOutcome::Authenticated(tokens))
    }
}
