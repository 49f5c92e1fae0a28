use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use tracing::{debug, info};

use crate::models::user::{FavouriteJob, ProfileFields, UserRecord};
use crate::storage::{StoreError, UserStore};

const USER_ID: &str = "userID";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";
const FAVOURITES: &str = "favourites";

type Item = HashMap<String, AttributeValue>;

/// Users table on DynamoDB. Every attribute is a string (`S`); favourites are a
/// JSON-encoded array in a single string attribute.
#[derive(Clone)]
pub struct DynamoUserStore {
    client: Client,
    table_name: String,
}

impl DynamoUserStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        info!("DynamoDB user store bound to table '{table_name}'");
        Self { client, table_name }
    }
}

fn backend<E>(err: E) -> StoreError
where
    E: std::error::Error + 'static,
{
    StoreError::Backend(DisplayErrorContext(&err).to_string())
}

fn key_value(user_id: &str) -> AttributeValue {
    AttributeValue::S(user_id.to_string())
}

/// Profile attributes in table order, paired with their attribute names.
fn profile_attributes(profile: &ProfileFields) -> [(&'static str, &str); 10] {
    [
        ("email", profile.email.as_str()),
        ("role", profile.role.as_str()),
        ("fullName", profile.full_name.as_str()),
        ("title", profile.title.as_str()),
        ("location", profile.location.as_str()),
        ("bio", profile.bio.as_str()),
        ("image", profile.image.as_str()),
        ("linkedin", profile.linkedin.as_str()),
        ("website", profile.website.as_str()),
        ("region", profile.region.as_str()),
    ]
}

fn string_attr(item: &Item, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .unwrap_or_default()
}

fn encode_favourites(favourites: &[FavouriteJob]) -> Result<String, StoreError> {
    serde_json::to_string(favourites).map_err(|e| StoreError::Corrupt {
        attribute: FAVOURITES.to_string(),
        reason: e.to_string(),
    })
}

fn decode_favourites(item: &Item) -> Result<Vec<FavouriteJob>, StoreError> {
    match item.get(FAVOURITES).and_then(|v| v.as_s().ok()) {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
            attribute: FAVOURITES.to_string(),
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn record_to_item(record: &UserRecord) -> Result<Item, StoreError> {
    let mut item = Item::new();
    item.insert(USER_ID.to_string(), key_value(&record.user_id));
    for (name, value) in profile_attributes(&record.profile) {
        item.insert(name.to_string(), AttributeValue::S(value.to_string()));
    }
    item.insert(
        CREATED_AT.to_string(),
        AttributeValue::S(record.created_at.clone()),
    );
    item.insert(
        UPDATED_AT.to_string(),
        AttributeValue::S(record.updated_at.clone()),
    );
    item.insert(
        FAVOURITES.to_string(),
        AttributeValue::S(encode_favourites(&record.favourites)?),
    );
    Ok(item)
}

pub(crate) fn record_from_item(item: &Item) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        user_id: string_attr(item, USER_ID),
        profile: ProfileFields {
            email: string_attr(item, "email"),
            role: string_attr(item, "role"),
            full_name: string_attr(item, "fullName"),
            title: string_attr(item, "title"),
            location: string_attr(item, "location"),
            bio: string_attr(item, "bio"),
            image: string_attr(item, "image"),
            linkedin: string_attr(item, "linkedin"),
            website: string_attr(item, "website"),
            region: string_attr(item, "region"),
        },
        created_at: string_attr(item, CREATED_AT),
        updated_at: string_attr(item, UPDATED_AT),
        favourites: decode_favourites(item)?,
    })
}

/// `SET #a = :a, #b = :b` over the given attribute names.
pub(crate) fn set_expression<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let assignments: Vec<String> = names
        .into_iter()
        .map(|name| format!("#{name} = :{name}"))
        .collect();
    format!("SET {}", assignments.join(", "))
}

impl DynamoUserStore {
    async fn fetch_item(&self, user_id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(USER_ID, key_value(user_id))
            .send()
            .await
            .map_err(backend)?;
        Ok(output.item().cloned())
    }

    /// Runs `SET` over the given string attributes on a single item.
    async fn set_attributes(&self, user_id: &str, values: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(USER_ID, key_value(user_id))
            .update_expression(set_expression(values.iter().map(|(name, _)| *name)));

        for (name, value) in values {
            request = request
                .expression_attribute_names(format!("#{name}"), *name)
                .expression_attribute_values(
                    format!(":{name}"),
                    AttributeValue::S((*value).to_string()),
                );
        }

        request.send().await.map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for DynamoUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_item(user_id)
            .await?
            .as_ref()
            .map(record_from_item)
            .transpose()
    }

    async fn put_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)?))
            .send()
            .await
            .map_err(backend)?;
        debug!("Put user item {}", record.user_id);
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: &ProfileFields,
        updated_at: &str,
    ) -> Result<(), StoreError> {
        let mut values: Vec<(&str, &str)> = profile_attributes(profile).to_vec();
        values.push((UPDATED_AT, updated_at));
        self.set_attributes(user_id, &values).await?;
        debug!("Updated profile attributes for {user_id}");
        Ok(())
    }

    async fn load_favourites(&self, user_id: &str) -> Result<Vec<FavouriteJob>, StoreError> {
        match self.fetch_item(user_id).await? {
            Some(item) => decode_favourites(&item),
            None => Ok(Vec::new()),
        }
    }

    async fn save_favourites(
        &self,
        user_id: &str,
        favourites: &[FavouriteJob],
    ) -> Result<(), StoreError> {
        let encoded = encode_favourites(favourites)?;
        self.set_attributes(user_id, &[(FAVOURITES, encoded.as_str())])
            .await?;
        debug!("Saved {} favourites for {user_id}", favourites.len());
        Ok(())
    }
}
