use axum::extract::State;

use crate::dto::candidate_dto::{ApiResponse, ApplicantView, ApplicationData};
use crate::routes::extract::{Json, Path};
use crate::AppState;

pub async fn get_application(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResponse<Option<ApplicantView>> {
    state
        .candidate_service
        .get_candidate_by_token(&token)
        .await
        .map(|c| c.map(ApplicantView::from))
}

pub async fn save_application(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(data): Json<ApplicationData>,
) -> ApiResponse<Option<ApplicantView>> {
    state
        .candidate_service
        .update_candidate_by_token(&token, data)
        .await
        .map(|c| c.map(ApplicantView::from))
}

pub async fn submit_application(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(data): Json<ApplicationData>,
) -> ApiResponse<Option<ApplicantView>> {
    tracing::info!("Application submission received");
    state
        .candidate_service
        .submit_application(&token, data)
        .await
        .map(|c| c.map(ApplicantView::from))
}
