use axum::{extract::State, http::StatusCode, Extension};

use crate::dto::candidate_dto::{
    ApiResponse, BulkCreatePayload, CreateCandidatePayload, RecruitmentStats,
    UpdateCandidatePayload,
};
use crate::middleware::auth::Claims;
use crate::models::candidate::Candidate;
use crate::routes::extract::{Json, Path};
use crate::AppState;

pub async fn create_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut payload): Json<CreateCandidatePayload>,
) -> ApiResponse<Option<Candidate>> {
    if payload.invited_by.is_none() {
        payload.invited_by = claims.actor_id();
    }
    state
        .candidate_service
        .create_candidate(payload)
        .await
        .with_status(StatusCode::CREATED)
}

pub async fn bulk_create_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut payload): Json<BulkCreatePayload>,
) -> ApiResponse<Vec<Candidate>> {
    if payload.invited_by.is_none() {
        payload.invited_by = claims.actor_id();
    }
    tracing::info!(
        "Bulk import of {} candidates requested by {}",
        payload.rows.len(),
        claims.sub
    );
    state
        .candidate_service
        .bulk_create_candidates(payload)
        .await
        .with_status(StatusCode::CREATED)
}

pub async fn list_candidates(State(state): State<AppState>) -> ApiResponse<Vec<Candidate>> {
    state.candidate_service.list_candidates().await
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> ApiResponse<Option<Candidate>> {
    state.candidate_service.get_candidate(id).await
}

pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCandidatePayload>,
) -> ApiResponse<Option<Candidate>> {
    if let Some(status) = payload.status {
        tracing::info!("{} moves candidate {} to {}", claims.sub, id, status);
    }
    state.candidate_service.update_candidate(id, payload).await
}

pub async fn get_recruitment_stats(State(state): State<AppState>) -> ApiResponse<RecruitmentStats> {
    state.candidate_service.get_recruitment_stats().await
}
