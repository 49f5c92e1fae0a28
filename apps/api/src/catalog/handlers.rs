use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::professionals::{FilterOptions, Professional, ProfessionalFilter};
use crate::catalog::talent_requests::{InterestRequest, NewTalentRequest, TalentRequest};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfessionalQuery {
    pub search: Option<String>,
    pub skills: Option<String>,
    pub services: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TalentRequestQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfessionalListResponse {
    pub professionals: Vec<Professional>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentRequestListResponse {
    pub talent_requests: Vec<TalentRequest>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct InterestResponse {
    pub message: String,
}

/// GET /api/professionals
pub async fn handle_list_professionals(
    State(state): State<AppState>,
    Query(q): Query<ProfessionalQuery>,
) -> Json<ProfessionalListResponse> {
    let filter = ProfessionalFilter::from_query(
        q.search.as_deref(),
        q.skills.as_deref(),
        q.services.as_deref(),
    );
    let directory = &state.catalog.professionals;
    Json(ProfessionalListResponse {
        professionals: directory.search(&filter),
        total: directory.all().len(),
    })
}

/// GET /api/professionals/filters
pub async fn handle_professional_filters(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.catalog.professionals.filter_options())
}

/// GET /api/professionals/:id
pub async fn handle_get_professional(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Professional>, AppError> {
    state
        .catalog
        .professionals
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Professional {id} not found")))
}

/// GET /api/talent-requests
pub async fn handle_list_talent_requests(
    State(state): State<AppState>,
    Query(q): Query<TalentRequestQuery>,
) -> Json<TalentRequestListResponse> {
    let board = &state.catalog.talent;
    let talent_requests = board.list(q.search.as_deref(), q.kind.as_deref()).await;
    let total = board.count().await;
    Json(TalentRequestListResponse {
        talent_requests,
        total,
    })
}

/// GET /api/talent-requests/:id
pub async fn handle_get_talent_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TalentRequest>, AppError> {
    state
        .catalog
        .talent
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Talent request not found".to_string()))
}

/// POST /api/talent-requests
pub async fn handle_create_talent_request(
    State(state): State<AppState>,
    Json(req): Json<NewTalentRequest>,
) -> Result<(StatusCode, Json<TalentRequest>), AppError> {
    let request = req.validate()?;
    let created = state.catalog.talent.create(request).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/talent-requests/:id/interest
pub async fn handle_express_interest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<InterestRequest>,
) -> Result<(StatusCode, Json<InterestResponse>), AppError> {
    let interest = req.validate()?;
    state.catalog.talent.record_interest(&id, interest).await?;
    Ok((
        StatusCode::CREATED,
        Json(InterestResponse {
            message: "Thanks for your interest. The poster has been notified.".to_string(),
        }),
    ))
}
