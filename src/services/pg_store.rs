use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::dto::candidate_dto::{DailyCount, RecruitmentStats};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, CandidateStatus, NewCandidateRecord};
use crate::services::candidate_store::{CandidateStore, TOKEN_LENGTH};
use crate::utils::token::generate_access_token;

macro_rules! candidate_columns {
    () => {
        "id, token, name, email, position, status, phone, experience, skills, resume_url, \
         invited_by, ai_score, ai_summary, notes, applied_at, created_at, updated_at"
    };
}

macro_rules! update_candidate_sql {
    ($key:literal) => {
        concat!(
            "UPDATE candidates SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                position = COALESCE($4, position), \
                phone = COALESCE($5, phone), \
                experience = COALESCE($6, experience), \
                skills = COALESCE($7, skills), \
                resume_url = COALESCE($8, resume_url), \
                status = COALESCE($9, status), \
                applied_at = COALESCE($10, applied_at), \
                ai_score = COALESCE($11, ai_score), \
                ai_summary = COALESCE($12, ai_summary), \
                notes = COALESCE($13, notes), \
                updated_at = NOW() \
             WHERE ",
            $key,
            " = $1 AND ($14::text IS NULL OR status = $14) RETURNING ",
            candidate_columns!()
        )
    };
}

const INSERT_CANDIDATE: &str = concat!(
    "INSERT INTO candidates (token, name, email, position, invited_by, status) \
     VALUES ($1, $2, $3, $4, $5, 'invited') RETURNING ",
    candidate_columns!()
);
const SELECT_BY_ID: &str =
    concat!("SELECT ", candidate_columns!(), " FROM candidates WHERE id = $1");
const SELECT_BY_TOKEN: &str =
    concat!("SELECT ", candidate_columns!(), " FROM candidates WHERE token = $1");
const SELECT_ALL: &str = concat!(
    "SELECT ",
    candidate_columns!(),
    " FROM candidates ORDER BY created_at DESC"
);

struct UpdateQueries {
    update: &'static str,
    current_status: &'static str,
}

const UPDATE_BY_ID: UpdateQueries = UpdateQueries {
    update: update_candidate_sql!("id"),
    current_status: "SELECT status FROM candidates WHERE id = $1",
};
const UPDATE_BY_TOKEN: UpdateQueries = UpdateQueries {
    update: update_candidate_sql!("token"),
    current_status: "SELECT status FROM candidates WHERE token = $1",
};

const UNIQUE_VIOLATION: &str = "23505";
const EMAIL_CONSTRAINT: &str = "candidates_email_key";
const TOKEN_CONSTRAINT: &str = "candidates_token_key";

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: Uuid,
    token: String,
    name: String,
    email: String,
    position: Option<String>,
    status: String,
    phone: Option<String>,
    experience: Option<String>,
    skills: Vec<String>,
    resume_url: Option<String>,
    invited_by: Option<Uuid>,
    ai_score: Option<i32>,
    ai_summary: Option<String>,
    notes: Option<String>,
    applied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = Error;

    fn try_from(row: CandidateRow) -> Result<Self> {
        Ok(Candidate {
            id: row.id,
            token: row.token,
            name: row.name,
            email: row.email,
            position: row.position,
            status: row.status.parse().map_err(Error::Internal)?,
            phone: row.phone,
            experience: row.experience,
            skills: row.skills,
            resume_url: row.resume_url,
            invited_by: row.invited_by,
            ai_score: row.ai_score,
            ai_summary: row.ai_summary,
            notes: row.notes,
            applied_at: row.applied_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_write_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return unique_violation(db.constraint());
        }
    }
    err.into()
}

fn unique_violation(constraint: Option<&str>) -> Error {
    match constraint {
        Some(EMAIL_CONSTRAINT) => {
            Error::Conflict("A candidate with this email address already exists.".into())
        }
        Some(TOKEN_CONSTRAINT) => {
            Error::Internal("Generated application token is already in use".into())
        }
        other => Error::Conflict(format!(
            "Candidate violates unique constraint {}",
            other.unwrap_or("unknown")
        )),
    }
}

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert<'e, E>(executor: E, record: NewCandidateRecord) -> Result<Candidate>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, CandidateRow>(INSERT_CANDIDATE)
            .bind(generate_access_token(TOKEN_LENGTH))
            .bind(record.name)
            .bind(record.email)
            .bind(record.position)
            .bind(record.invited_by)
            .fetch_one(executor)
            .await
            .map_err(map_write_error)?;
        row.try_into()
    }

    /// Runs a guarded update and tells a missing row apart from a status
    /// mismatch.
    async fn update_where<K>(
        &self,
        queries: &UpdateQueries,
        key: K,
        patch: CandidatePatch,
    ) -> Result<Candidate>
    where
        K: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Clone + 'static,
    {
        let expected = patch.expected_status;
        let row = sqlx::query_as::<_, CandidateRow>(queries.update)
            .bind(key.clone())
            .bind(patch.name)
            .bind(patch.email)
            .bind(patch.position)
            .bind(patch.phone)
            .bind(patch.experience)
            .bind(patch.skills)
            .bind(patch.resume_url)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.applied_at)
            .bind(patch.ai_score)
            .bind(patch.ai_summary)
            .bind(patch.notes)
            .bind(expected.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        if let Some(row) = row {
            return row.try_into();
        }

        let current: Option<String> = sqlx::query_scalar(queries.current_status)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match (current, expected) {
            (Some(status), Some(expected)) => Err(Error::Conflict(format!(
                "Candidate status is {}, expected {}",
                status, expected
            ))),
            _ => Err(Error::NotFound("Candidate not found".into())),
        }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn get_candidate_by_token(&self, token: &str) -> Result<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(SELECT_BY_TOKEN)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn create_candidate(&self, record: NewCandidateRecord) -> Result<Candidate> {
        Self::insert(&self.pool, record).await
    }

    async fn bulk_create_candidates(
        &self,
        records: Vec<NewCandidateRecord>,
    ) -> Result<Vec<Candidate>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            created.push(Self::insert(&mut *tx, record).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> Result<Candidate> {
        self.update_where(&UPDATE_BY_ID, id, patch).await
    }

    async fn update_candidate_by_token(
        &self,
        token: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate> {
        self.update_where(&UPDATE_BY_TOKEN, token.to_string(), patch).await
    }

    async fn get_candidates(&self) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn get_recruitment_stats(&self) -> Result<RecruitmentStats> {
        let status_rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM candidates
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(status_rows.len());
        for (status, count) in status_rows {
            match status.parse::<CandidateStatus>() {
                Ok(status) => counts.push((status, count)),
                Err(e) => tracing::warn!("Skipping unknown status in stats: {}", e),
            }
        }

        let submitted: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE applied_at IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;

        let history: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT TO_CHAR(applied_at, 'YYYY-MM-DD') AS date, COUNT(*)
            FROM candidates
            WHERE applied_at > NOW() - INTERVAL '7 days'
            GROUP BY TO_CHAR(applied_at, 'YYYY-MM-DD')
            ORDER BY date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(RecruitmentStats::from_counts(
            counts,
            submitted,
            history
                .into_iter()
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
        ))
    }
}
