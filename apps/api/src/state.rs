use std::sync::Arc;

use crate::admin::moderation::ModerationQueues;
use crate::auth::provider::IdentityProvider;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::storage::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users table. DynamoDB in deployments, in-process map for demos and tests.
    pub users: Arc<dyn UserStore>,
    /// Hosted identity provider used by the sign-up/sign-in endpoints.
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: Arc<Catalog>,
    pub moderation: Arc<ModerationQueues>,
    pub config: Config,
}
