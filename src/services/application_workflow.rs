use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::dto::candidate_dto::ApplicationData;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, CandidateStatus};
use crate::services::candidate_store::CandidateStore;
use crate::services::workflow_notifier::WorkflowNotifier;
use crate::utils::time::now;

pub const INVALID_TOKEN: &str = "Invalid application token";
const CLOSED: &str = "Application is no longer open";

/// Moves a candidate from `invited` through `applied` and, when the
/// automation system accepts the hand-off, on to `ai_analyzed`.
///
/// Both writes are compare-and-set on the current status, so a token can be
/// submitted once. After the `applied` write commits, nothing downstream
/// turns the call into a failure.
#[derive(Clone)]
pub struct ApplicationWorkflow {
    store: Arc<dyn CandidateStore>,
    notifier: Arc<dyn WorkflowNotifier>,
}

impl ApplicationWorkflow {
    pub fn new(store: Arc<dyn CandidateStore>, notifier: Arc<dyn WorkflowNotifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn submit_application(
        &self,
        token: &str,
        data: ApplicationData,
    ) -> Result<Candidate> {
        let candidate = self
            .store
            .get_candidate_by_token(token)
            .await?
            .ok_or_else(|| Error::NotFound(INVALID_TOKEN.into()))?;

        if candidate.has_applied() {
            return Err(Error::Conflict("Application already submitted".into()));
        }
        if candidate.status != CandidateStatus::Invited {
            return Err(Error::Conflict(CLOSED.into()));
        }
        data.validate()?;

        let mut patch = data.into_patch();
        patch.status = Some(CandidateStatus::Applied);
        patch.applied_at = Some(now());
        let patch = patch.guarded_by(CandidateStatus::Invited);

        let applied = match self.store.update_candidate_by_token(token, patch).await {
            Ok(c) => c,
            Err(Error::Conflict(_)) => {
                return Err(Error::Conflict("Application already submitted".into()))
            }
            Err(Error::NotFound(_)) => return Err(Error::NotFound(INVALID_TOKEN.into())),
            Err(e) => return Err(e),
        };
        info!("Candidate {} submitted application", applied.id);

        if let Err(e) = self.notifier.submit_candidate(&applied).await {
            warn!(
                "Workflow notification failed for candidate {}, leaving status applied: {}",
                applied.id, e
            );
            return Ok(applied);
        }

        let analyzed = self
            .store
            .update_candidate(
                applied.id,
                CandidatePatch::status(CandidateStatus::AiAnalyzed)
                    .guarded_by(CandidateStatus::Applied),
            )
            .await;
        match analyzed {
            Ok(c) => {
                info!("Candidate {} handed off for AI analysis", c.id);
                Ok(c)
            }
            Err(e) => {
                warn!(
                    "Could not mark candidate {} as ai_analyzed after notification: {}",
                    applied.id, e
                );
                Ok(applied)
            }
        }
    }
}
