use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::moderation::{ApprovedProfile, PendingProfile, ReportedProfile};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfilesResponse<T> {
    pub profiles: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct ModerationResponse<T> {
    pub message: String,
    pub profile: T,
}

/// GET /api/admin/profiles/pending
pub async fn handle_list_pending(State(state): State<AppState>) -> Json<ProfilesResponse<PendingProfile>> {
    Json(ProfilesResponse {
        profiles: state.moderation.pending().await,
    })
}

/// GET /api/admin/profiles/approved?search=
pub async fn handle_list_approved(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Json<ProfilesResponse<ApprovedProfile>> {
    Json(ProfilesResponse {
        profiles: state.moderation.approved(q.search.as_deref()).await,
    })
}

/// GET /api/admin/profiles/reported
pub async fn handle_list_reported(State(state): State<AppState>) -> Json<ProfilesResponse<ReportedProfile>> {
    Json(ProfilesResponse {
        profiles: state.moderation.reported().await,
    })
}

/// POST /api/admin/profiles/pending/:id/approve
pub async fn handle_approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse<ApprovedProfile>>, AppError> {
    let profile = state.moderation.approve(&id).await?;
    Ok(Json(ModerationResponse {
        message: "Profile approved".to_string(),
        profile,
    }))
}

/// POST /api/admin/profiles/pending/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse<PendingProfile>>, AppError> {
    let profile = state.moderation.reject(&id).await?;
    Ok(Json(ModerationResponse {
        message: "Profile rejected".to_string(),
        profile,
    }))
}

/// POST /api/admin/profiles/reported/:id/dismiss
pub async fn handle_dismiss_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse<ReportedProfile>>, AppError> {
    let profile = state.moderation.dismiss_report(&id).await?;
    Ok(Json(ModerationResponse {
        message: "Report dismissed".to_string(),
        profile,
    }))
}

/// POST /api/admin/profiles/reported/:id/remove
pub async fn handle_remove_reported(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse<ReportedProfile>>, AppError> {
    let profile = state.moderation.remove_reported(&id).await?;
    Ok(Json(ModerationResponse {
        message: "Profile removed".to_string(),
        profile,
    }))
}
