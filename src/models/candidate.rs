use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub token: String,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub status: CandidateStatus,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub invited_by: Option<Uuid>,
    pub ai_score: Option<i32>,
    pub ai_summary: Option<String>,
    pub notes: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    /// `applied_at` is written by the submit step and never cleared.
    pub fn has_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    pub fn can_move_to(&self, next: CandidateStatus) -> bool {
        self.status.can_transition_to(next, self.has_applied())
    }
}

/// Pipeline state of a candidate.
///
/// `invited -> applied -> ai_analyzed` is driven by the application workflow.
/// The remaining states belong to staff pipeline management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Invited,
    Applied,
    AiAnalyzed,
    Shortlisted,
    Interviewing,
    Offered,
    Hired,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 8] = [
        CandidateStatus::Invited,
        CandidateStatus::Applied,
        CandidateStatus::AiAnalyzed,
        CandidateStatus::Shortlisted,
        CandidateStatus::Interviewing,
        CandidateStatus::Offered,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Invited => "invited",
            CandidateStatus::Applied => "applied",
            CandidateStatus::AiAnalyzed => "ai_analyzed",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Interviewing => "interviewing",
            CandidateStatus::Offered => "offered",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }

    /// Statuses that only the application workflow may enter.
    pub fn is_workflow_owned(&self) -> bool {
        matches!(
            self,
            CandidateStatus::Invited | CandidateStatus::Applied | CandidateStatus::AiAnalyzed
        )
    }

    /// Whether staff may move a candidate from `self` to `next`.
    /// `has_applied` is whether an application was ever submitted; a
    /// rejected invitee never re-enters the pipeline.
    pub fn can_transition_to(&self, next: CandidateStatus, has_applied: bool) -> bool {
        if next.is_workflow_owned() {
            return false;
        }
        match next {
            CandidateStatus::Rejected => true,
            _ => has_applied && *self != CandidateStatus::Invited,
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown candidate status: {}", s))
    }
}

/// Fields needed to create a candidate. The store mints `id` and `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidateRecord {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub invited_by: Option<Uuid>,
}

/// Partial update applied by the store. `None` leaves a field untouched.
///
/// When `expected_status` is set the write only happens if the stored status
/// still matches; otherwise the store answers with `Error::Conflict`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub status: Option<CandidateStatus>,
    pub applied_at: Option<DateTime<Utc>>,
    pub ai_score: Option<i32>,
    pub ai_summary: Option<String>,
    pub notes: Option<String>,
    pub expected_status: Option<CandidateStatus>,
}

impl CandidatePatch {
    pub fn status(status: CandidateStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn guarded_by(mut self, expected: CandidateStatus) -> Self {
        self.expected_status = Some(expected);
        self
    }

    pub fn apply_to(&self, candidate: &mut Candidate) {
        if let Some(v) = &self.name {
            candidate.name = v.clone();
        }
        if let Some(v) = &self.email {
            candidate.email = v.clone();
        }
        if let Some(v) = &self.position {
            candidate.position = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            candidate.phone = Some(v.clone());
        }
        if let Some(v) = &self.experience {
            candidate.experience = Some(v.clone());
        }
        if let Some(v) = &self.skills {
            candidate.skills = v.clone();
        }
        if let Some(v) = &self.resume_url {
            candidate.resume_url = Some(v.clone());
        }
        if let Some(v) = self.status {
            candidate.status = v;
        }
        if let Some(v) = self.applied_at {
            candidate.applied_at = Some(v);
        }
        if let Some(v) = self.ai_score {
            candidate.ai_score = Some(v);
        }
        if let Some(v) = &self.ai_summary {
            candidate.ai_summary = Some(v.clone());
        }
        if let Some(v) = &self.notes {
            candidate.notes = Some(v.clone());
        }
    }
}
