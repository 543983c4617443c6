use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::candidate_dto::{
    AnalysisCallbackPayload, ApiResponse, ApplicationData, BulkCreatePayload,
    CreateCandidatePayload, RecruitmentStats, UpdateCandidatePayload,
};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, CandidateStatus};
use crate::services::application_workflow::{ApplicationWorkflow, INVALID_TOKEN};
use crate::services::candidate_store::CandidateStore;

/// Candidate operations exposed to request handlers.
///
/// Every method answers with an `ApiResponse` envelope; store and validation
/// failures are logged and folded into `error`.
#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    workflow: ApplicationWorkflow,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>, workflow: ApplicationWorkflow) -> Self {
        Self { store, workflow }
    }

    pub async fn create_candidate(
        &self,
        payload: CreateCandidatePayload,
    ) -> ApiResponse<Option<Candidate>> {
        let result = async {
            payload.validate()?;
            self.store.create_candidate(payload.into()).await
        }
        .await;
        if let Ok(c) = &result {
            tracing::info!("Invited candidate {} ({})", c.id, c.email);
        }
        wrap("create_candidate", result.map(Some))
    }

    pub async fn bulk_create_candidates(
        &self,
        payload: BulkCreatePayload,
    ) -> ApiResponse<Vec<Candidate>> {
        let result = async {
            payload.validate()?;
            let invited_by = payload.invited_by;
            let records = payload
                .rows
                .into_iter()
                .map(|row| row.into_record(invited_by))
                .collect();
            self.store.bulk_create_candidates(records).await
        }
        .await;
        if let Ok(created) = &result {
            tracing::info!("Bulk invited {} candidates", created.len());
        }
        wrap("bulk_create_candidates", result)
    }

    pub async fn get_candidate(&self, id: Uuid) -> ApiResponse<Option<Candidate>> {
        let result = self.store.get_candidate(id).await.and_then(|c| {
            c.map(Some)
                .ok_or_else(|| Error::NotFound("Candidate not found".into()))
        });
        wrap("get_candidate", result)
    }

    pub async fn get_candidate_by_token(&self, token: &str) -> ApiResponse<Option<Candidate>> {
        let result = self.store.get_candidate_by_token(token).await.and_then(|c| {
            c.map(Some)
                .ok_or_else(|| Error::NotFound(INVALID_TOKEN.into()))
        });
        wrap("get_candidate_by_token", result)
    }

    /// Staff update. Status changes must follow the pipeline rules.
    pub async fn update_candidate(
        &self,
        id: Uuid,
        payload: UpdateCandidatePayload,
    ) -> ApiResponse<Option<Candidate>> {
        let result = async {
            payload.validate()?;
            let mut patch = payload.into_patch();
            if let Some(next) = patch.status {
                let current = self
                    .store
                    .get_candidate(id)
                    .await?
                    .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
                if current.status != next && !current.can_move_to(next) {
                    return Err(Error::BadRequest(format!(
                        "Cannot move candidate from {} to {}",
                        current.status, next
                    )));
                }
                patch = patch.guarded_by(current.status);
            }
            self.store.update_candidate(id, patch).await
        }
        .await;
        wrap("update_candidate", result.map(Some))
    }

    /// Applicant draft save, accepted only before the application is submitted.
    pub async fn update_candidate_by_token(
        &self,
        token: &str,
        data: ApplicationData,
    ) -> ApiResponse<Option<Candidate>> {
        let result = async {
            data.validate()?;
            let patch = data.into_patch().guarded_by(CandidateStatus::Invited);
            match self.store.update_candidate_by_token(token, patch).await {
                Err(Error::NotFound(_)) => Err(Error::NotFound(INVALID_TOKEN.into())),
                Err(Error::Conflict(_)) => Err(Error::Conflict(
                    "Application already submitted and can no longer be edited".into(),
                )),
                other => other,
            }
        }
        .await;
        wrap("update_candidate_by_token", result.map(Some))
    }

    pub async fn list_candidates(&self) -> ApiResponse<Vec<Candidate>> {
        wrap("list_candidates", self.store.get_candidates().await)
    }

    pub async fn get_recruitment_stats(&self) -> ApiResponse<RecruitmentStats> {
        wrap("get_recruitment_stats", self.store.get_recruitment_stats().await)
    }

    pub async fn submit_application(
        &self,
        token: &str,
        data: ApplicationData,
    ) -> ApiResponse<Option<Candidate>> {
        let result = self.workflow.submit_application(token, data).await;
        wrap("submit_application", result.map(Some))
    }

    /// Stores the automation system's verdict and completes the hand-off if
    /// the candidate is still waiting in `applied`.
    pub async fn record_analysis(
        &self,
        payload: AnalysisCallbackPayload,
    ) -> ApiResponse<Option<Candidate>> {
        let result = async {
            payload.validate()?;
            let current = self
                .store
                .get_candidate(payload.candidate_id)
                .await?
                .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
            let mut patch = CandidatePatch {
                ai_score: Some(payload.score),
                ai_summary: payload.summary,
                ..Default::default()
            };
            if current.status == CandidateStatus::Applied {
                patch.status = Some(CandidateStatus::AiAnalyzed);
            }
            self.store
                .update_candidate(current.id, patch.guarded_by(current.status))
                .await
        }
        .await;
        wrap("record_analysis", result.map(Some))
    }
}

fn wrap<T: Default>(operation: &str, result: Result<T>) -> ApiResponse<T> {
    if let Err(e) = &result {
        if e.status_code().is_server_error() {
            tracing::error!(operation, error = %e, "candidate operation failed");
        } else {
            tracing::debug!(operation, error = %e, "candidate operation rejected");
        }
    }
    ApiResponse::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::candidate_dto::BulkCandidateRow;
    use crate::services::candidate_store::MockCandidateStore;
    use crate::services::memory_store::MemoryCandidateStore;
    use crate::services::workflow_notifier::MockWorkflowNotifier;
    use axum::http::StatusCode;

    fn service_with(store: Arc<dyn CandidateStore>) -> CandidateService {
        let mut notifier = MockWorkflowNotifier::new();
        notifier
            .expect_submit_candidate()
            .returning(|_| Err(Error::Notifier("offline".into())));
        let workflow = ApplicationWorkflow::new(store.clone(), Arc::new(notifier));
        CandidateService::new(store, workflow)
    }

    fn new_candidate(email: &str) -> CreateCandidatePayload {
        CreateCandidatePayload {
            name: "Grace Hopper".into(),
            email: email.into(),
            position: Some("Compiler Engineer".into()),
            invited_by: None,
        }
    }

    #[tokio::test]
    async fn store_failures_become_error_envelopes() {
        let mut store = MockCandidateStore::new();
        store
            .expect_get_candidates()
            .returning(|| Err(Error::Upstream("connection refused".into())));
        store
            .expect_get_recruitment_stats()
            .returning(|| Err(Error::Upstream("connection refused".into())));
        let service = service_with(Arc::new(store));

        let list = service.list_candidates().await;
        assert!(list.data.is_empty());
        assert!(list.error.is_some());
        assert_eq!(list.http_status, StatusCode::BAD_GATEWAY);

        let stats = service.get_recruitment_stats().await;
        assert_eq!(stats.data, RecruitmentStats::default());
        assert!(stats.error.is_some());
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_store() {
        let mut store = MockCandidateStore::new();
        store.expect_create_candidate().never();
        let service = service_with(Arc::new(store));

        let resp = service.create_candidate(new_candidate("not-an-email")).await;
        assert!(resp.data.is_none());
        assert_eq!(resp.http_status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bulk_create_stamps_inviter_and_mints_distinct_tokens() {
        let service = service_with(Arc::new(MemoryCandidateStore::new()));
        let inviter = Uuid::new_v4();
        let resp = service
            .bulk_create_candidates(BulkCreatePayload {
                rows: (0..3)
                    .map(|i| BulkCandidateRow {
                        name: format!("Candidate {}", i),
                        email: format!("c{}@example.com", i),
                        position: None,
                    })
                    .collect(),
                invited_by: Some(inviter),
            })
            .await;

        assert!(resp.is_ok());
        assert_eq!(resp.data.len(), 3);
        let mut tokens: Vec<_> = resp.data.iter().map(|c| c.token.clone()).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 3);
        assert!(resp
            .data
            .iter()
            .all(|c| c.invited_by == Some(inviter) && c.status == CandidateStatus::Invited));
    }

    #[tokio::test]
    async fn draft_save_is_rejected_after_submission() {
        let service = service_with(Arc::new(MemoryCandidateStore::new()));
        let c = service
            .create_candidate(new_candidate("grace@example.com"))
            .await
            .data
            .unwrap();

        let draft = service
            .update_candidate_by_token(
                &c.token,
                ApplicationData {
                    experience: Some("COBOL".into()),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(draft.data.unwrap().experience.as_deref(), Some("COBOL"));

        let submitted = service
            .submit_application(&c.token, ApplicationData::default())
            .await;
        assert_eq!(submitted.data.unwrap().status, CandidateStatus::Applied);

        let late = service
            .update_candidate_by_token(
                &c.token,
                ApplicationData {
                    phone: Some("555-0199".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(late.data.is_none());
        assert_eq!(late.http_status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn staff_status_changes_follow_pipeline_rules() {
        let service = service_with(Arc::new(MemoryCandidateStore::new()));
        let c = service
            .create_candidate(new_candidate("grace@example.com"))
            .await
            .data
            .unwrap();

        let premature = service
            .update_candidate(
                c.id,
                UpdateCandidatePayload {
                    status: Some(CandidateStatus::Shortlisted),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(premature.http_status, StatusCode::BAD_REQUEST);

        service
            .submit_application(&c.token, ApplicationData::default())
            .await;
        let shortlisted = service
            .update_candidate(
                c.id,
                UpdateCandidatePayload {
                    status: Some(CandidateStatus::Shortlisted),
                    notes: Some("Strong systems background".into()),
                    ..Default::default()
                },
            )
            .await;
        let shortlisted = shortlisted.data.unwrap();
        assert_eq!(shortlisted.status, CandidateStatus::Shortlisted);
        assert_eq!(shortlisted.notes.as_deref(), Some("Strong systems background"));
    }

    #[tokio::test]
    async fn analysis_callback_completes_the_hand_off() {
        let service = service_with(Arc::new(MemoryCandidateStore::new()));
        let c = service
            .create_candidate(new_candidate("grace@example.com"))
            .await
            .data
            .unwrap();
        service
            .submit_application(&c.token, ApplicationData::default())
            .await;

        let resp = service
            .record_analysis(AnalysisCallbackPayload {
                candidate_id: c.id,
                score: 87,
                summary: Some("Good fit".into()),
            })
            .await;
        let analyzed = resp.data.unwrap();
        assert_eq!(analyzed.status, CandidateStatus::AiAnalyzed);
        assert_eq!(analyzed.ai_score, Some(87));

        let missing = service
            .record_analysis(AnalysisCallbackPayload {
                candidate_id: Uuid::new_v4(),
                score: 10,
                summary: None,
            })
            .await;
        assert_eq!(missing.http_status, StatusCode::NOT_FOUND);
    }
}
