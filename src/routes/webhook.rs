use axum::{extract::State, http::HeaderMap};
use subtle::ConstantTimeEq;

use crate::{
    dto::candidate_dto::{AnalysisCallbackPayload, ApiResponse},
    error::{Error, Result},
    models::candidate::Candidate,
    routes::extract::Json,
    AppState,
};

/// Analysis result posted back by the automation workflow.
pub async fn handle_analysis_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AnalysisCallbackPayload>,
) -> Result<ApiResponse<Option<Candidate>>> {
    verify_secret(&state, &headers)?;
    tracing::info!(
        "Analysis result received for candidate {} (score {})",
        payload.candidate_id,
        payload.score
    );
    Ok(state.candidate_service.record_analysis(payload).await)
}

fn verify_secret(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.webhook_secret.as_deref() else {
        return Err(Error::Unauthorized("webhook_secret_not_configured".into()));
    };
    let Some(secret_hdr) = headers.get("x-webhook-secret") else {
        return Err(Error::Unauthorized("missing_webhook_secret".into()));
    };
    let provided = secret_hdr
        .to_str()
        .map_err(|_| Error::Unauthorized("invalid_secret_header".into()))?;
    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_webhook_secret".into()))
    }
}
