use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{FavouriteJob, UserView};
use crate::state::AppState;
use crate::users::favourites::{add_favourite, remove_favourite};
use crate::users::profiles::{upsert_user, ProfileDetails, SaveOutcome};
use crate::validation::{non_blank, require};

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

#[derive(Debug, Serialize)]
pub struct SaveUserResponse {
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct FavouritesResponse {
    pub favourites: Vec<FavouriteJob>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavouriteRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub job: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFavouriteRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

/// POST /api/users
///
/// Creates the profile on first save, updates it afterwards.
pub async fn handle_save_user(
    State(state): State<AppState>,
    Json(req): Json<SaveUserRequest>,
) -> Result<Json<SaveUserResponse>, AppError> {
    const MISSING: &str = "Missing required fields: userID, email, or role";
    let user_id = require(req.user_id, MISSING)?;
    let email = require(req.email, MISSING)?;
    let role = require(req.role, MISSING)?;

    let profile = req.details.into_profile(email, role);
    let (record, outcome) = upsert_user(state.users.as_ref(), &user_id, profile).await?;

    let message = match outcome {
        SaveOutcome::Created => "User profile created successfully",
        SaveOutcome::Updated => "User profile updated successfully",
    };

    Ok(Json(SaveUserResponse {
        message: message.to_string(),
        user: UserView::from(&record),
    }))
}

/// GET /api/users?userID=
pub async fn handle_get_user(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UserView>, AppError> {
    let user_id = require(params.user_id, "Missing userID")?;

    let record = state
        .users
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserView::from(&record)))
}

/// GET /api/favourites?userID=
pub async fn handle_get_favourites(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FavouritesResponse>, AppError> {
    let user_id = require(params.user_id, "Missing userID")?;
    let favourites = state.users.load_favourites(&user_id).await?;
    Ok(Json(FavouritesResponse { favourites }))
}

/// POST /api/favourites
pub async fn handle_add_favourite(
    State(state): State<AppState>,
    Json(req): Json<AddFavouriteRequest>,
) -> Result<Json<FavouritesResponse>, AppError> {
    const MISSING: &str = "Missing required fields: userID or job";
    let user_id = require(req.user_id, MISSING)?;
    let job = req
        .job
        .filter(|j| !j.is_null())
        .ok_or_else(|| AppError::Validation(MISSING.to_string()))?;
    let job: FavouriteJob = serde_json::from_value(job)
        .map_err(|_| AppError::Validation("job must be an object with a string jobId".to_string()))?;
    if job.job_id.trim().is_empty() {
        return Err(AppError::Validation("job.jobId cannot be empty".to_string()));
    }

    let mut favourites = state.users.load_favourites(&user_id).await?;
    if add_favourite(&mut favourites, job) {
        info!("Added favourite for user {user_id}");
    }
    state.users.save_favourites(&user_id, &favourites).await?;

    Ok(Json(FavouritesResponse { favourites }))
}

/// DELETE /api/favourites
pub async fn handle_remove_favourite(
    State(state): State<AppState>,
    Json(req): Json<RemoveFavouriteRequest>,
) -> Result<Json<FavouritesResponse>, AppError> {
    const MISSING: &str = "Missing required fields: userID or jobId";
    let user_id = require(req.user_id, MISSING)?;
    let job_id = non_blank(req.job_id).ok_or_else(|| AppError::Validation(MISSING.to_string()))?;

    let mut favourites = state.users.load_favourites(&user_id).await?;
    if remove_favourite(&mut favourites, &job_id) {
        info!("Removed favourite {job_id} for user {user_id}");
    }
    state.users.save_favourites(&user_id, &favourites).await?;

    Ok(Json(FavouritesResponse { favourites }))
}
