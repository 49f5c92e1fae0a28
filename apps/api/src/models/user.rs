use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role assumed when a stored record carries none.
pub const DEFAULT_ROLE: &str = "Employee";

/// Profile attributes written on both the create and the update path.
/// Every attribute is a plain string; absent values are stored as `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub title: String,
    pub location: String,
    pub bio: String,
    pub image: String,
    pub linkedin: String,
    pub website: String,
    pub region: String,
}

/// A saved job. Only `jobId` is interpreted; the rest is kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouriteJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// One item of the users table, keyed by `user_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub profile: ProfileFields,
    pub created_at: String,
    pub updated_at: String,
    pub favourites: Vec<FavouriteJob>,
}

impl UserRecord {
    /// Fresh record with `created_at == updated_at == now` and no favourites.
    pub fn new(user_id: impl Into<String>, profile: ProfileFields) -> Self {
        let now = timestamp_now();
        Self {
            user_id: user_id.into(),
            profile,
            created_at: now.clone(),
            updated_at: now,
            favourites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactView {
    pub email: String,
    pub linkedin: String,
    pub website: String,
}

/// Public shape of a user returned by the users API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub role: String,
    pub email: String,
    pub full_name: String,
    pub title: String,
    pub location: String,
    pub bio: String,
    pub image: String,
    pub region: String,
    pub created_at: String,
    pub updated_at: String,
    pub contact: ContactView,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        let p = &record.profile;
        let role = if p.role.is_empty() {
            DEFAULT_ROLE.to_string()
        } else {
            p.role.clone()
        };
        UserView {
            user_id: record.user_id.clone(),
            role,
            email: p.email.clone(),
            full_name: p.full_name.clone(),
            title: p.title.clone(),
            location: p.location.clone(),
            bio: p.bio.clone(),
            image: p.image.clone(),
            region: p.region.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
            contact: ContactView {
                email: p.email.clone(),
                linkedin: p.linkedin.clone(),
                website: p.website.clone(),
            },
        }
    }
}

/// Current UTC time as ISO-8601 with millisecond precision, e.g. `2024-05-01T09:30:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
