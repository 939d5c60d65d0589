use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::decode_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

/// A job seeker's application to one posting.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_company: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: OffsetDateTime,
    pub reviewed_at: Option<OffsetDateTime>,
    pub reviewed_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_company: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: String,
    pub applied_at: OffsetDateTime,
    pub reviewed_at: Option<OffsetDateTime>,
    pub reviewed_by: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = anyhow::Error;

    fn try_from(r: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            job_id: r.job_id,
            job_title: r.job_title,
            job_company: r.job_company,
            user_id: r.user_id,
            user_name: r.user_name,
            user_email: r.user_email,
            user_phone: r.user_phone,
            cover_letter: r.cover_letter,
            resume_url: r.resume_url,
            portfolio_url: r.portfolio_url,
            linkedin_url: r.linkedin_url,
            status: decode_text(&r.status)?,
            applied_at: r.applied_at,
            reviewed_at: r.reviewed_at,
            reviewed_by: r.reviewed_by,
            notes: r.notes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub job_title: String,
    pub job_company: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone)]
pub struct ApplicationReview {
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
    pub reviewed_by: String,
    pub reviewed_at: OffsetDateTime,
}
