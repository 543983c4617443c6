use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::candidate_dto::{DailyCount, RecruitmentStats};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, CandidateStatus, NewCandidateRecord};
use crate::services::candidate_store::{CandidateStore, TOKEN_LENGTH};
use crate::utils::{time::now, token::generate_access_token};

#[derive(Default)]
struct Inner {
    candidates: HashMap<Uuid, Candidate>,
    by_token: HashMap<String, Uuid>,
}

impl Inner {
    fn email_taken(&self, email: &str) -> bool {
        self.candidates.values().any(|c| c.email == email)
    }

    fn mint_token(&self) -> String {
        loop {
            let token = generate_access_token(TOKEN_LENGTH);
            if !self.by_token.contains_key(&token) {
                return token;
            }
        }
    }

    fn build(&self, record: NewCandidateRecord) -> Candidate {
        let ts = now();
        Candidate {
            id: Uuid::new_v4(),
            token: self.mint_token(),
            name: record.name,
            email: record.email,
            position: record.position,
            status: CandidateStatus::Invited,
            phone: None,
            experience: None,
            skills: Vec::new(),
            resume_url: None,
            invited_by: record.invited_by,
            ai_score: None,
            ai_summary: None,
            notes: None,
            applied_at: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn insert(&mut self, candidate: Candidate) {
        self.by_token.insert(candidate.token.clone(), candidate.id);
        self.candidates.insert(candidate.id, candidate);
    }

    fn patch(&mut self, id: Uuid, patch: &CandidatePatch) -> Result<Candidate> {
        if let Some(email) = &patch.email {
            if self.candidates.values().any(|c| c.id != id && &c.email == email) {
                return Err(duplicate_email());
            }
        }
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        if let Some(expected) = patch.expected_status {
            if candidate.status != expected {
                return Err(Error::Conflict(format!(
                    "Candidate status is {}, expected {}",
                    candidate.status, expected
                )));
            }
        }
        patch.apply_to(candidate);
        candidate.updated_at = now();
        Ok(candidate.clone())
    }
}

fn duplicate_email() -> Error {
    Error::Conflict("A candidate with this email address already exists.".into())
}

/// Process-local candidate store.
#[derive(Default)]
pub struct MemoryCandidateStore {
    inner: RwLock<Inner>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.inner.read().await.candidates.get(&id).cloned())
    }

    async fn get_candidate_by_token(&self, token: &str) -> Result<Option<Candidate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_token
            .get(token)
            .and_then(|id| inner.candidates.get(id))
            .cloned())
    }

    async fn create_candidate(&self, record: NewCandidateRecord) -> Result<Candidate> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&record.email) {
            return Err(duplicate_email());
        }
        let candidate = inner.build(record);
        inner.insert(candidate.clone());
        Ok(candidate)
    }

    async fn bulk_create_candidates(
        &self,
        records: Vec<NewCandidateRecord>,
    ) -> Result<Vec<Candidate>> {
        let mut inner = self.inner.write().await;
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            if inner.email_taken(&record.email) || !seen.insert(record.email.as_str()) {
                return Err(Error::Conflict(format!(
                    "A candidate with email {} already exists.",
                    record.email
                )));
            }
        }

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let candidate = inner.build(record);
            inner.insert(candidate.clone());
            created.push(candidate);
        }
        Ok(created)
    }

    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> Result<Candidate> {
        self.inner.write().await.patch(id, &patch)
    }

    async fn update_candidate_by_token(
        &self,
        token: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate> {
        let mut inner = self.inner.write().await;
        let id = *inner
            .by_token
            .get(token)
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        inner.patch(id, &patch)
    }

    async fn get_candidates(&self) -> Result<Vec<Candidate>> {
        let mut candidates: Vec<Candidate> =
            self.inner.read().await.candidates.values().cloned().collect();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(candidates)
    }

    async fn get_recruitment_stats(&self) -> Result<RecruitmentStats> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<CandidateStatus, i64> = HashMap::new();
        let mut history: BTreeMap<String, i64> = BTreeMap::new();
        let since = now() - Duration::days(7);

        let mut submitted = 0;
        for candidate in inner.candidates.values() {
            *counts.entry(candidate.status).or_insert(0) += 1;
            if candidate.has_applied() {
                submitted += 1;
            }
            if let Some(applied_at) = candidate.applied_at.filter(|ts| *ts > since) {
                *history
                    .entry(applied_at.format("%Y-%m-%d").to_string())
                    .or_insert(0) += 1;
            }
        }

        let history = history
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();
        Ok(RecruitmentStats::from_counts(counts, submitted, history))
    }
}
