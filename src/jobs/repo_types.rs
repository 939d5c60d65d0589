use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::decode_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Internship,
    Contract,
    Remote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

/// Job posting.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub experience_level: Option<ExperienceLevel>,
    pub application_deadline: Option<OffsetDateTime>,
    pub posted_by: Uuid,
    pub posted_by_email: String,
    pub posted_by_name: String,
    pub posted_date: OffsetDateTime,
    pub applications_count: i64,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub skills: Vec<String>,
    pub status: String,
    pub experience_level: Option<String>,
    pub application_deadline: Option<OffsetDateTime>,
    pub posted_by: Uuid,
    pub posted_by_email: String,
    pub posted_by_name: String,
    pub posted_date: OffsetDateTime,
    pub applications_count: i64,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            company: r.company,
            location: r.location,
            job_type: decode_text(&r.job_type)?,
            salary: r.salary,
            description: r.description,
            requirements: r.requirements,
            benefits: r.benefits,
            skills: r.skills,
            status: decode_text(&r.status)?,
            experience_level: r.experience_level.as_deref().map(decode_text).transpose()?,
            application_deadline: r.application_deadline,
            posted_by: r.posted_by,
            posted_by_email: r.posted_by_email,
            posted_by_name: r.posted_by_name,
            posted_date: r.posted_date,
            applications_count: r.applications_count,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub experience_level: Option<ExperienceLevel>,
    pub application_deadline: Option<OffsetDateTime>,
    pub posted_by: Uuid,
    pub posted_by_email: String,
    pub posted_by_name: String,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub skills: Option<Vec<String>>,
    pub status: Option<JobStatus>,
    pub experience_level: Option<ExperienceLevel>,
    pub application_deadline: Option<OffsetDateTime>,
}

impl JobPatch {
    pub fn apply_to(self, job: &mut Job) {
        if let Some(v) = self.title {
            job.title = v;
        }
        if let Some(v) = self.company {
            job.company = v;
        }
        if let Some(v) = self.location {
            job.location = v;
        }
        if let Some(v) = self.job_type {
            job.job_type = v;
        }
        if let Some(v) = self.salary {
            job.salary = Some(v);
        }
        if let Some(v) = self.description {
            job.description = v;
        }
        if let Some(v) = self.requirements {
            job.requirements = v;
        }
        if let Some(v) = self.benefits {
            job.benefits = Some(v);
        }
        if let Some(v) = self.skills {
            job.skills = v;
        }
        if let Some(v) = self.status {
            job.status = v;
        }
        if let Some(v) = self.experience_level {
            job.experience_level = Some(v);
        }
        if let Some(v) = self.application_deadline {
            job.application_deadline = Some(v);
        }
    }
}

/// Public listing filters. Only active postings are listed.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub skills: Vec<String>,
    pub skip: i64,
    pub limit: i64,
}

impl JobFilter {
    /// Same semantics as the SQL query, used by the in-memory store.
    pub fn matches(&self, job: &Job) -> bool {
        if job.status != JobStatus::Active {
            return false;
        }
        if let Some(q) = self.search.as_deref().map(str::to_lowercase) {
            let hit = job.title.to_lowercase().contains(&q)
                || job.company.to_lowercase().contains(&q)
                || job.description.to_lowercase().contains(&q)
                || job.skills.iter().any(|s| s.to_lowercase() == q);
            if !hit {
                return false;
            }
        }
        if let Some(loc) = self.location.as_deref() {
            if !job.location.to_lowercase().contains(&loc.to_lowercase()) {
                return false;
            }
        }
        if self.job_type.is_some_and(|t| t != job.job_type) {
            return false;
        }
        if self.experience_level.is_some() && self.experience_level != job.experience_level {
            return false;
        }
        if !self.skills.is_empty() && !job.skills.iter().any(|s| self.skills.contains(s)) {
            return false;
        }
        true
    }
}
