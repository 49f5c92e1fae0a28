mod admin;
mod auth;
mod catalog;
mod config;
mod errors;
mod models;
mod resume;
mod routes;
mod state;
mod storage;
mod users;
mod validation;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_dynamodb::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::admin::moderation::ModerationQueues;
use crate::auth::cognito::CognitoIdentityProvider;
use crate::catalog::Catalog;
use crate::config::{Config, StorageBackend};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{DynamoUserStore, MemoryUserStore, UserStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent Hub API v{}", env!("CARGO_PKG_VERSION"));

    let sdk_config = load_aws_config(&config).await;
    info!("AWS config loaded (region: {})", config.aws_region);

    let users = build_user_store(&config, &sdk_config);

    let identity = Arc::new(CognitoIdentityProvider::new(
        aws_sdk_cognitoidentityprovider::Client::new(&sdk_config),
        config.cognito_client_id.clone(),
    ));

    let catalog = Arc::new(Catalog::load()?);
    let moderation = Arc::new(ModerationQueues::load()?);

    let state = AppState {
        users,
        identity,
        catalog,
        moderation,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared AWS config. Static keys from the environment win over the default
/// provider chain when both are set.
async fn load_aws_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "talent-hub-static",
        ));
    }

    loader.load().await
}

fn build_user_store(config: &Config, sdk_config: &SdkConfig) -> Arc<dyn UserStore> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory user store; data is lost on restart");
            Arc::new(MemoryUserStore::new())
        }
        StorageBackend::DynamoDb => {
            let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
            if let Some(endpoint) = &config.dynamodb_endpoint {
                info!("DynamoDB endpoint override: {endpoint}");
                builder = builder.endpoint_url(endpoint);
            }
            let client = aws_sdk_dynamodb::Client::from_conf(builder.build());
            Arc::new(DynamoUserStore::new(client, config.users_table.clone()))
        }
    }
}
