use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{timestamp_now, ProfileFields, UserRecord};
use crate::storage::UserStore;

/// Optional profile attributes accepted by the users and signup endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub region: Option<String>,
}

impl ProfileDetails {
    /// Fills every absent attribute with `""`.
    pub fn into_profile(self, email: String, role: String) -> ProfileFields {
        ProfileFields {
            email,
            role,
            full_name: self.full_name.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            linkedin: self.linkedin.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Creates the user when absent, otherwise overwrites its profile attributes.
/// Returns the record as it now stands.
pub async fn upsert_user(
    store: &dyn UserStore,
    user_id: &str,
    profile: ProfileFields,
) -> Result<(UserRecord, SaveOutcome), AppError> {
    match store.get_user(user_id).await? {
        Some(mut existing) => {
            let now = timestamp_now();
            store.update_profile(user_id, &profile, &now).await?;
            existing.profile = profile;
            existing.updated_at = now;
            info!("Updated profile for user {user_id}");
            Ok((existing, SaveOutcome::Updated))
        }
        None => {
            let record = UserRecord::new(user_id, profile);
            store.put_user(&record).await?;
            info!("Created profile for user {user_id}");
            Ok((record, SaveOutcome::Created))
        }
    }
}
