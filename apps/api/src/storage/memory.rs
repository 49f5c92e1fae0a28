use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::user::{FavouriteJob, ProfileFields, UserRecord};
use crate::storage::{StoreError, UserStore};

/// In-process users table. Mirrors the DynamoDB store's upsert behaviour so
/// it can stand in for local demos and tests.
#[derive(Default)]
pub struct MemoryUserStore {
    items: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn blank_record(user_id: &str) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        profile: ProfileFields::default(),
        created_at: String::new(),
        updated_at: String::new(),
        favourites: Vec::new(),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.items.read().await.get(user_id).cloned())
    }

    async fn put_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: &ProfileFields,
        updated_at: &str,
    ) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let record = items
            .entry(user_id.to_string())
            .or_insert_with(|| blank_record(user_id));
        record.profile = profile.clone();
        record.updated_at = updated_at.to_string();
        Ok(())
    }

    async fn load_favourites(&self, user_id: &str) -> Result<Vec<FavouriteJob>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .get(user_id)
            .map(|r| r.favourites.clone())
            .unwrap_or_default())
    }

    async fn save_favourites(
        &self,
        user_id: &str,
        favourites: &[FavouriteJob],
    ) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let record = items
            .entry(user_id.to_string())
            .or_insert_with(|| blank_record(user_id));
        record.favourites = favourites.to_vec();
        Ok(())
    }
}
