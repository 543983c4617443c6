use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Error;
use crate::models::candidate::{Candidate, CandidatePatch, CandidateStatus, NewCandidateRecord};

/// Uniform result of every candidate operation.
///
/// Failures are carried in `error` next to the empty default of `data`
/// (`null` for single records, `[]` for lists).
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub http_status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            error: None,
            http_status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        if self.error.is_none() {
            self.http_status = status;
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            error: self.error,
            http_status: self.http_status,
        }
    }
}

impl<T: Default> ApiResponse<T> {
    pub fn failure(err: &Error) -> Self {
        Self {
            data: T::default(),
            error: Some(err.public_message()),
            http_status: err.status_code(),
        }
    }

    pub fn from_result(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(max = 200))]
    pub position: Option<String>,
    pub invited_by: Option<uuid::Uuid>,
}

impl From<CreateCandidatePayload> for NewCandidateRecord {
    fn from(payload: CreateCandidatePayload) -> Self {
        Self {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            position: payload.position,
            invited_by: payload.invited_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkCandidateRow {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(max = 200))]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkCreatePayload {
    #[validate(length(min = 1, max = 500), nested)]
    pub rows: Vec<BulkCandidateRow>,
    pub invited_by: Option<uuid::Uuid>,
}

impl BulkCandidateRow {
    pub fn into_record(self, invited_by: Option<uuid::Uuid>) -> NewCandidateRecord {
        NewCandidateRecord {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            position: self.position,
            invited_by,
        }
    }
}

/// Applicant-supplied fields. Every field is optional, `{}` is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplicationData {
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 10000))]
    pub experience: Option<String>,
    #[validate(length(max = 100))]
    pub skills: Option<Vec<String>>,
    #[validate(url(message = "resume_url must be a URL"))]
    pub resume_url: Option<String>,
}

impl ApplicationData {
    pub fn into_patch(self) -> CandidatePatch {
        CandidatePatch {
            phone: self.phone,
            experience: self.experience,
            skills: self.skills.map(|skills| {
                skills
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            resume_url: self.resume_url,
            ..Default::default()
        }
    }
}

/// What an applicant sees through their token. Staff-only fields stay out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantView {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub status: CandidateStatus,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Candidate> for ApplicantView {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            position: c.position,
            status: c.status,
            phone: c.phone,
            experience: c.experience,
            skills: c.skills,
            resume_url: c.resume_url,
            applied_at: c.applied_at,
        }
    }
}

/// Staff-side changes to a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub position: Option<String>,
    #[validate(length(max = 10000))]
    pub notes: Option<String>,
    pub status: Option<CandidateStatus>,
}

impl UpdateCandidatePayload {
    pub fn into_patch(self) -> CandidatePatch {
        CandidatePatch {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| e.trim().to_lowercase()),
            position: self.position,
            notes: self.notes,
            status: self.status,
            ..Default::default()
        }
    }
}

/// Result posted back by the automation workflow after analysing a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalysisCallbackPayload {
    pub candidate_id: uuid::Uuid,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentStats {
    pub total_candidates: i64,
    pub by_status: BTreeMap<String, i64>,
    pub applications_last_7_days: Vec<DailyCount>,
    pub application_rate: f64,
}

impl RecruitmentStats {
    /// `submitted` counts candidates with `applied_at` set, whatever their
    /// current status.
    pub fn from_counts<I>(
        status_counts: I,
        submitted: i64,
        applications_last_7_days: Vec<DailyCount>,
    ) -> Self
    where
        I: IntoIterator<Item = (CandidateStatus, i64)>,
    {
        let mut by_status: BTreeMap<String, i64> = CandidateStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut total = 0;
        for (status, count) in status_counts {
            *by_status.entry(status.as_str().to_string()).or_insert(0) += count;
            total += count;
        }
        let application_rate = if total > 0 {
            submitted as f64 / total as f64
        } else {
            0.0
        };

        Self {
            total_candidates: total,
            by_status,
            applications_last_7_days,
            application_rate,
        }
    }
}
