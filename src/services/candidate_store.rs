use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::candidate_dto::RecruitmentStats;
use crate::error::Result;
use crate::models::candidate::{Candidate, CandidatePatch, NewCandidateRecord};

pub const TOKEN_LENGTH: usize = 32;

/// Persistence for candidate records, addressable by id or application token.
///
/// Implementations mint `id`, `token` and the timestamps. Updates honour
/// `CandidatePatch::expected_status`: a mismatch yields `Error::Conflict`,
/// an unknown key yields `Error::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn get_candidate_by_token(&self, token: &str) -> Result<Option<Candidate>>;

    async fn create_candidate(&self, record: NewCandidateRecord) -> Result<Candidate>;

    async fn bulk_create_candidates(
        &self,
        records: Vec<NewCandidateRecord>,
    ) -> Result<Vec<Candidate>>;

    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> Result<Candidate>;

    async fn update_candidate_by_token(
        &self,
        token: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate>;

    async fn get_candidates(&self) -> Result<Vec<Candidate>>;

    async fn get_recruitment_stats(&self) -> Result<RecruitmentStats>;
}
