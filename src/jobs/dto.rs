use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ExperienceLevel, Job, JobFilter, JobPatch, JobStatus, JobType};

pub const DEFAULT_PAGE: i64 = 20;
pub const MAX_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub application_deadline: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub skills: Option<Vec<String>>,
    pub status: Option<JobStatus>,
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub application_deadline: Option<OffsetDateTime>,
}

impl From<UpdateJobRequest> for JobPatch {
    fn from(r: UpdateJobRequest) -> Self {
        Self {
            title: r.title.map(|s| s.trim().to_string()),
            company: r.company.map(|s| s.trim().to_string()),
            location: r.location.map(|s| s.trim().to_string()),
            job_type: r.job_type,
            salary: r.salary,
            description: r.description,
            requirements: r.requirements,
            benefits: r.benefits,
            skills: r.skills,
            status: r.status,
            experience_level: r.experience_level,
            application_deadline: r.application_deadline,
        }
    }
}

/// Query string of the public listing.
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    #[serde(alias = "experience")]
    pub experience_level: Option<ExperienceLevel>,
    /// Comma-separated.
    pub skills: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl From<JobQuery> for JobFilter {
    fn from(q: JobQuery) -> Self {
        let non_blank = |s: Option<String>| {
            s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        Self {
            search: non_blank(q.search),
            location: non_blank(q.location),
            job_type: q.job_type,
            experience_level: q.experience_level,
            skills: q
                .skills
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            skip: q.skip.unwrap_or(0).max(0),
            limit: q.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub experience_level: Option<ExperienceLevel>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub application_deadline: Option<OffsetDateTime>,
    pub posted_by: Uuid,
    pub posted_by_email: String,
    pub posted_by_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub posted_date: OffsetDateTime,
    pub applications_count: i64,
}

impl From<Job> for JobResponse {
    fn from(j: Job) -> Self {
        Self {
            id: j.id,
            title: j.title,
            company: j.company,
            location: j.location,
            job_type: j.job_type,
            salary: j.salary,
            description: j.description,
            requirements: j.requirements,
            benefits: j.benefits,
            skills: j.skills,
            status: j.status,
            experience_level: j.experience_level,
            application_deadline: j.application_deadline,
            posted_by: j.posted_by,
            posted_by_email: j.posted_by_email,
            posted_by_name: j.posted_by_name,
            posted_date: j.posted_date,
            applications_count: j.applications_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobCountResponse {
    pub total_jobs: i64,
    pub active_jobs: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteJobResponse {
    pub message: &'static str,
    pub job_id: Uuid,
}
