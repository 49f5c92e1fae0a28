//! Persistence for user profiles and their favourites.
//!
//! One table, one item per user keyed by `userID`. Every operation touches a
//! single item; concurrent writers to the same user simply overwrite each other.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::{FavouriteJob, ProfileFields, UserRecord};

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoUserStore;
pub use memory::MemoryUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing service rejected or failed the call. Carries its message verbatim.
    #[error("{0}")]
    Backend(String),

    /// A stored attribute could not be decoded.
    #[error("corrupt attribute '{attribute}': {reason}")]
    Corrupt { attribute: String, reason: String },
}

/// Single-key access to the users table.
///
/// Carried in `AppState` as `Arc<dyn UserStore>`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Writes the whole record, replacing any existing item.
    async fn put_user(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Overwrites the profile attributes and `updatedAt`, leaving `createdAt`
    /// and favourites as they are.
    async fn update_profile(
        &self,
        user_id: &str,
        profile: &ProfileFields,
        updated_at: &str,
    ) -> Result<(), StoreError>;

    /// Favourites for a user; empty when the user or the attribute is absent.
    async fn load_favourites(&self, user_id: &str) -> Result<Vec<FavouriteJob>, StoreError>;

    /// Replaces the favourites attribute, creating the item when missing.
    async fn save_favourites(
        &self,
        user_id: &str,
        favourites: &[FavouriteJob],
    ) -> Result<(), StoreError>;
}
